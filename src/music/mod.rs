pub mod player;
pub mod queue;
pub mod restore;
pub mod source;

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serenity::model::id::{ChannelId, GuildId};
use songbird::tracks::TrackHandle;
use tokio::sync::RwLock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub author: Option<String>,
    pub uri: String,
    pub length_secs: Option<u64>,
    pub requester_id: Option<u64>,
    pub requester_name: String,
}

impl Track {
    /// `m:ss`, or `h:mm:ss` for anything an hour or longer.
    pub fn length_label(&self) -> Option<String> {
        self.length_secs.map(format_secs)
    }
}

pub fn format_secs(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    #[default]
    Off,
    Track,
    Queue,
}

impl LoopMode {
    /// Stable name used for storage and command arguments.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Track => "track",
            Self::Queue => "queue",
        }
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "Off"),
            Self::Track => write!(f, "Track"),
            Self::Queue => write!(f, "Queue"),
        }
    }
}

impl FromStr for LoopMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "track" | "song" => Ok(Self::Track),
            "queue" | "all" => Ok(Self::Queue),
            other => Err(format!("unknown loop mode `{other}`")),
        }
    }
}

pub struct GuildPlayer {
    pub queue: VecDeque<Track>,
    pub current: Option<Track>,
    pub loop_mode: LoopMode,
    /// 0.0 – 1.0
    pub volume: f32,
    pub track_handle: Option<TrackHandle>,
    pub playlist_name: Option<String>,
    pub voice_channel: Option<ChannelId>,
    pub text_channel: Option<ChannelId>,
}

impl Default for GuildPlayer {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            current: None,
            loop_mode: LoopMode::Off,
            volume: 1.0,
            track_handle: None,
            playlist_name: None,
            voice_channel: None,
            text_channel: None,
        }
    }
}

impl GuildPlayer {
    /// Current track followed by the queue, the order a saved playlist uses.
    pub fn all_tracks(&self) -> Vec<Track> {
        self.current.iter().chain(self.queue.iter()).cloned().collect()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }
}

pub type PlayerManager = Arc<RwLock<HashMap<GuildId, GuildPlayer>>>;

pub fn new_player_manager() -> PlayerManager {
    Arc::new(RwLock::new(HashMap::new()))
}
