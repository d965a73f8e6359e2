pub mod commands;
pub mod config;
pub mod events;
pub mod export;
pub mod game;
pub mod music;
pub mod storage;
pub mod utils;
pub mod voice;

use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[derive(Clone)]
pub struct Data {
    pub games: game::GameRegistry,
    pub players: music::PlayerManager,
    pub http_client: reqwest::Client,
    pub db: Arc<storage::Database>,
    pub idle_leave: std::time::Duration,
    pub voice: voice::VoiceSessions,
    /// Voice chat replies come from Gemini when set; otherwise the bot reads
    /// members' messages aloud.
    pub gemini_api_key: Option<String>,
    pub tts_lang: String,
}
