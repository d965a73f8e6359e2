//! Voice chat sessions: members type in a text channel and the bot answers
//! out loud in a voice channel.

pub mod gemini;
pub mod relay;
pub mod tts;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serenity::model::id::{ChannelId, GuildId, UserId};
use thiserror::Error;
use tokio::sync::RwLock;

/// Turns kept per session. Older ones are dropped.
const HISTORY_LIMIT: usize = 20;
/// Turns handed to the model for a reply.
pub const CONTEXT_TURNS: usize = 5;

pub const WELCOME: &str = "Hello! I'm your voice assistant. Type in the chat and I'll answer out loud.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Speaker {
    Member(String),
    Bot,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct VoiceSession {
    pub voice_channel: ChannelId,
    pub text_channel: ChannelId,
    pub owner: UserId,
    pub started_at: DateTime<Utc>,
    history: VecDeque<Turn>,
}

impl VoiceSession {
    pub fn new(voice_channel: ChannelId, text_channel: ChannelId, owner: UserId) -> Self {
        Self {
            voice_channel,
            text_channel,
            owner,
            started_at: Utc::now(),
            history: VecDeque::new(),
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.history.push_back(turn);
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Turn> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// The member who started the session, or a server administrator.
    pub fn can_end(&self, user: UserId, is_admin: bool) -> bool {
        is_admin || user == self.owner
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum VoiceError {
    #[error("a voice chat is already running in this server")]
    AlreadyActive,
    #[error("there is no voice chat running in this server")]
    NotActive,
    #[error("only the member who started the voice chat or an administrator can end it")]
    NotOwner,
}

pub type VoiceSessions = Arc<RwLock<HashMap<GuildId, VoiceSession>>>;

pub fn new_voice_sessions() -> VoiceSessions {
    Arc::new(RwLock::new(HashMap::new()))
}

pub async fn begin(
    sessions: &VoiceSessions,
    guild_id: GuildId,
    session: VoiceSession,
) -> Result<(), VoiceError> {
    let mut map = sessions.write().await;
    if map.contains_key(&guild_id) {
        return Err(VoiceError::AlreadyActive);
    }
    map.insert(guild_id, session);
    Ok(())
}

pub async fn is_active(sessions: &VoiceSessions, guild_id: GuildId) -> bool {
    sessions.read().await.contains_key(&guild_id)
}

/// Ends the session if `user` may. The caller disconnects from voice.
pub async fn end(
    sessions: &VoiceSessions,
    guild_id: GuildId,
    user: UserId,
    is_admin: bool,
) -> Result<VoiceSession, VoiceError> {
    let mut map = sessions.write().await;
    let session = map.get(&guild_id).ok_or(VoiceError::NotActive)?;
    if !session.can_end(user, is_admin) {
        return Err(VoiceError::NotOwner);
    }
    map.remove(&guild_id).ok_or(VoiceError::NotActive)
}

/// Drops the session without a permission check, e.g. after the bot was
/// disconnected from voice.
pub async fn discard(sessions: &VoiceSessions, guild_id: GuildId) -> Option<VoiceSession> {
    sessions.write().await.remove(&guild_id)
}

/// Records a member's message if it was typed in the session's text channel
/// and returns the context for the reply.
pub async fn record_member(
    sessions: &VoiceSessions,
    guild_id: GuildId,
    channel_id: ChannelId,
    author: &str,
    text: &str,
) -> Option<Vec<Turn>> {
    let mut map = sessions.write().await;
    let session = map
        .get_mut(&guild_id)
        .filter(|s| s.text_channel == channel_id)?;
    session.push(Turn {
        speaker: Speaker::Member(author.to_string()),
        text: text.to_string(),
    });
    Some(session.recent(CONTEXT_TURNS))
}

pub async fn record_reply(sessions: &VoiceSessions, guild_id: GuildId, text: &str) {
    if let Some(session) = sessions.write().await.get_mut(&guild_id) {
        session.push(Turn {
            speaker: Speaker::Bot,
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUILD: GuildId = GuildId::new(1);
    const VOICE: ChannelId = ChannelId::new(10);
    const TEXT: ChannelId = ChannelId::new(11);
    const OWNER: UserId = UserId::new(100);
    const OTHER: UserId = UserId::new(200);

    async fn started() -> VoiceSessions {
        let sessions = new_voice_sessions();
        begin(&sessions, GUILD, VoiceSession::new(VOICE, TEXT, OWNER))
            .await
            .unwrap();
        sessions
    }

    #[tokio::test]
    async fn test_one_session_per_guild() {
        let sessions = started().await;
        let err = begin(&sessions, GUILD, VoiceSession::new(VOICE, TEXT, OTHER))
            .await
            .unwrap_err();
        assert_eq!(err, VoiceError::AlreadyActive);

        begin(&sessions, GuildId::new(2), VoiceSession::new(VOICE, TEXT, OTHER))
            .await
            .unwrap();
        assert!(is_active(&sessions, GuildId::new(2)).await);
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_can_end() {
        let sessions = started().await;

        assert_eq!(end(&sessions, GUILD, OTHER, false).await.unwrap_err(), VoiceError::NotOwner);
        assert!(is_active(&sessions, GUILD).await);

        let ended = end(&sessions, GUILD, OTHER, true).await.unwrap();
        assert_eq!(ended.owner, OWNER);
        assert!(!is_active(&sessions, GUILD).await);
        assert_eq!(end(&sessions, GUILD, OWNER, false).await.unwrap_err(), VoiceError::NotActive);
    }

    #[tokio::test]
    async fn test_messages_outside_the_text_channel_are_ignored() {
        let sessions = started().await;
        assert!(record_member(&sessions, GUILD, ChannelId::new(99), "bob", "hi").await.is_none());
        assert!(record_member(&sessions, GuildId::new(5), TEXT, "bob", "hi").await.is_none());

        let context = record_member(&sessions, GUILD, TEXT, "bob", "hi").await.unwrap();
        assert_eq!(
            context,
            [Turn {
                speaker: Speaker::Member("bob".to_string()),
                text: "hi".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_context_is_the_latest_turns() {
        let sessions = started().await;
        for i in 0..30 {
            record_member(&sessions, GUILD, TEXT, "bob", &format!("q{i}")).await;
            record_reply(&sessions, GUILD, &format!("a{i}")).await;
        }

        let context = record_member(&sessions, GUILD, TEXT, "bob", "last").await.unwrap();
        let texts: Vec<&str> = context.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["q28", "a28", "q29", "a29", "last"]);

        let map = sessions.read().await;
        assert_eq!(map[&GUILD].history.len(), HISTORY_LIMIT);
    }

    #[tokio::test]
    async fn test_discard_skips_permission_check() {
        let sessions = started().await;
        assert!(discard(&sessions, GUILD).await.is_some());
        assert!(discard(&sessions, GUILD).await.is_none());
    }
}
