use std::sync::Arc;

use arena_bot::{commands, config, events, game, music, storage, voice, Data};
use poise::serenity_prelude as serenity;
use songbird::SerenityInit;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::Config::from_env();

    let db = match storage::Database::open(&config.db_path) {
        Ok(db) => {
            tracing::info!("database ready: {}", config.db_path);
            Arc::new(db)
        }
        Err(e) => {
            tracing::error!("failed to open database {}: {e}", config.db_path);
            return;
        }
    };

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let game_idle_timeout = config.game_idle_timeout;
    let idle_leave = config.idle_leave;
    let gemini_api_key = config.gemini_api_key.clone();
    let tts_lang = config.tts_lang.clone();
    if gemini_api_key.is_none() {
        tracing::info!("GEMINI_API_KEY not set, voice chat will read messages aloud");
    }

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    if let Err(e) = poise::builtins::on_error(error).await {
                        tracing::error!("error while handling error: {e}");
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("registering {} commands", framework.options().commands.len());
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let players = music::new_player_manager();
                let http_client = reqwest::Client::new();

                if let Some(manager) = songbird::get(ctx).await {
                    music::restore::restore_all(&manager, &players, &http_client, &db).await;
                }

                Ok(Data {
                    games: game::GameRegistry::new(game_idle_timeout),
                    players,
                    http_client,
                    db,
                    idle_leave,
                    voice: voice::new_voice_sessions(),
                    gemini_api_key,
                    tts_lang,
                })
            })
        })
        .build();

    let mut client = match serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .register_songbird()
        .await
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("failed to build client: {e}");
            return;
        }
    };

    if let Err(e) = client.start().await {
        tracing::error!("client error: {e}");
    }
}
