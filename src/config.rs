use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "data/arena.db";
pub const DEFAULT_GAME_IDLE_SECS: u64 = 300;
pub const DEFAULT_IDLE_LEAVE_SECS: u64 = 30;
pub const DEFAULT_TTS_LANG: &str = "en";

pub struct Config {
    pub discord_token: String,
    pub db_path: String,
    /// A tic-tac-toe game with no accepted move for this long times out.
    pub game_idle_timeout: Duration,
    /// How long the bot stays alone in a voice channel before leaving.
    pub idle_leave: Duration,
    pub gemini_api_key: Option<String>,
    /// Language code for spoken voice chat replies.
    pub tts_lang: String,
}

fn secs_from_env(key: &str, default: u64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            discord_token: std::env::var("DISCORD_TOKEN")
                .expect("DISCORD_TOKEN environment variable is required"),
            db_path: std::env::var("ARENA_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            game_idle_timeout: secs_from_env("ARENA_GAME_IDLE_SECS", DEFAULT_GAME_IDLE_SECS),
            idle_leave: secs_from_env("ARENA_IDLE_LEAVE_SECS", DEFAULT_IDLE_LEAVE_SECS),
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            tts_lang: std::env::var("ARENA_TTS_LANG")
                .ok()
                .filter(|lang| !lang.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TTS_LANG.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_from_env_falls_back_on_bad_values() {
        std::env::set_var("ARENA_TEST_SECS_GARBAGE", "soon");
        assert_eq!(secs_from_env("ARENA_TEST_SECS_GARBAGE", 300), Duration::from_secs(300));

        std::env::set_var("ARENA_TEST_SECS_ZERO", "0");
        assert_eq!(secs_from_env("ARENA_TEST_SECS_ZERO", 30), Duration::from_secs(30));

        std::env::set_var("ARENA_TEST_SECS_SET", " 45 ");
        assert_eq!(secs_from_env("ARENA_TEST_SECS_SET", 30), Duration::from_secs(45));

        assert_eq!(secs_from_env("ARENA_TEST_SECS_UNSET", 7), Duration::from_secs(7));
    }
}
