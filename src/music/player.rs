use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, UserId};
use songbird::events::{Event, EventContext, EventHandler, TrackEvent};
use songbird::input::YoutubeDl;
use songbird::tracks::PlayMode;
use songbird::Call;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::{queue, PlayerManager, Track};
use crate::storage::{Database, MusicState};
use crate::Data;

/// Everything needed to drive one guild's voice connection.
#[derive(Clone)]
pub struct Playback {
    pub guild_id: GuildId,
    pub players: PlayerManager,
    pub http_client: reqwest::Client,
    pub db: Arc<Database>,
    pub call: Arc<Mutex<Call>>,
}

struct TrackEndNotifier {
    playback: Playback,
}

#[async_trait]
impl EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let ended = match ctx {
            EventContext::Track(tracks) => tracks.first().map(|(_, handle)| handle.uuid()),
            _ => None,
        };
        let playback = self.playback.clone();
        tokio::spawn(async move {
            // Stopping a track for a skip or a new play also ends it; only a
            // track that is still the current one advances the queue.
            let still_current = {
                let players = playback.players.read().await;
                players
                    .get(&playback.guild_id)
                    .and_then(|p| p.track_handle.as_ref())
                    .map(|h| h.uuid())
            };
            if ended.is_none() || still_current != ended {
                return;
            }
            if let Err(e) = playback.play_next(false).await {
                error!("failed to start next track in {}: {e}", playback.guild_id);
            }
        });
        None
    }
}

impl Playback {
    pub async fn play(&self, track: &Track) -> Result<(), crate::Error> {
        let src = YoutubeDl::new(self.http_client.clone(), track.uri.clone());
        let volume = {
            let mut players = self.players.write().await;
            let p = players.entry(self.guild_id).or_default();
            p.track_handle = None;
            p.volume
        };

        let handle = {
            let mut call = self.call.lock().await;
            let handle = call.play_only(src.into());
            let _ = handle.set_volume(volume);
            handle.add_event(
                Event::Track(TrackEvent::End),
                TrackEndNotifier {
                    playback: self.clone(),
                },
            )?;
            handle
        };

        {
            let mut players = self.players.write().await;
            if let Some(p) = players.get_mut(&self.guild_id) {
                p.track_handle = Some(handle);
            }
        }

        info!("now playing in {}: {}", self.guild_id, track.title);
        self.save_snapshot().await;
        Ok(())
    }

    /// Moves to the next track, or goes idle if the queue is exhausted.
    pub async fn play_next(&self, skipped: bool) -> Result<(), crate::Error> {
        match queue::advance(&self.players, self.guild_id, skipped).await {
            Some(track) => self.play(&track).await?,
            None => {
                info!("queue finished in {}", self.guild_id);
                {
                    let mut players = self.players.write().await;
                    if let Some(p) = players.get_mut(&self.guild_id) {
                        p.track_handle = None;
                    }
                }
                {
                    let mut call = self.call.lock().await;
                    call.stop();
                }
                self.save_snapshot().await;
            }
        }
        Ok(())
    }

    /// Starts the queue if nothing is playing yet. Returns whether playback
    /// was started.
    pub async fn start_if_idle(&self) -> Result<bool, crate::Error> {
        let idle = {
            let players = self.players.read().await;
            players
                .get(&self.guild_id)
                .map_or(true, |p| p.current.is_none())
        };
        if !idle {
            return Ok(false);
        }
        self.play_next(true).await?;
        Ok(queue::current(&self.players, self.guild_id).await.is_some())
    }

    pub async fn save_snapshot(&self) {
        if let Some(state) = snapshot(&self.players, self.guild_id).await {
            if let Err(e) = self.db.save_state(&state) {
                warn!("failed to save music state for {}: {e}", self.guild_id);
            }
        }
    }
}

/// The voice channel `user_id` is currently in, from the cache.
pub fn user_voice_channel(
    ctx: &serenity::client::Context,
    guild_id: GuildId,
    user_id: UserId,
) -> Option<ChannelId> {
    let guild = ctx.cache.guild(guild_id)?;
    guild.voice_states.get(&user_id).and_then(|vs| vs.channel_id)
}

/// Joins `voice_channel` and records where the player lives.
pub async fn connect(
    ctx: &serenity::client::Context,
    data: &Data,
    guild_id: GuildId,
    voice_channel: ChannelId,
    text_channel: ChannelId,
) -> Result<Playback, crate::Error> {
    if crate::voice::is_active(&data.voice, guild_id).await {
        return Err("A voice chat is running in this server. End it with /endvoicechat first.".into());
    }

    let manager = songbird::get(ctx)
        .await
        .ok_or("voice client is not registered")?;
    let call = manager.join(guild_id, voice_channel).await?;

    {
        let mut players = data.players.write().await;
        let p = players.entry(guild_id).or_default();
        p.voice_channel = Some(voice_channel);
        p.text_channel = Some(text_channel);
    }

    Ok(Playback {
        guild_id,
        players: data.players.clone(),
        http_client: data.http_client.clone(),
        db: Arc::clone(&data.db),
        call,
    })
}

/// Playback handle for a guild the bot is already connected in.
pub async fn existing(ctx: &serenity::client::Context, data: &Data, guild_id: GuildId) -> Option<Playback> {
    let call = songbird::get(ctx).await?.get(guild_id)?;
    Some(Playback {
        guild_id,
        players: data.players.clone(),
        http_client: data.http_client.clone(),
        db: Arc::clone(&data.db),
        call,
    })
}

pub async fn is_paused(players: &PlayerManager, guild_id: GuildId) -> bool {
    let handle = {
        let players = players.read().await;
        players.get(&guild_id).and_then(|p| p.track_handle.clone())
    };
    match handle {
        Some(h) => h
            .get_info()
            .await
            .map(|info| info.playing == PlayMode::Pause)
            .unwrap_or(false),
        None => false,
    }
}

/// Builds a storable snapshot of a guild's player. `None` when the bot has
/// no voice channel there.
pub async fn snapshot(players: &PlayerManager, guild_id: GuildId) -> Option<MusicState> {
    let (mut state, handle) = {
        let players = players.read().await;
        let p = players.get(&guild_id)?;
        let channel = p.voice_channel?;
        let state = MusicState {
            text_channel_id: p.text_channel.map(|c| c.get()),
            current: p.current.clone(),
            loop_mode: p.loop_mode,
            volume: (p.volume * 100.0).round().clamp(0.0, 100.0) as u8,
            playlist_name: p.playlist_name.clone(),
            queue: p.queue.iter().cloned().collect(),
            ..MusicState::new(guild_id.get(), channel.get())
        };
        (state, p.track_handle.clone())
    };

    if let Some(handle) = handle {
        if let Ok(info) = handle.get_info().await {
            state.current_position_secs = info.position.as_secs();
        }
    }
    Some(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{new_player_manager, LoopMode};

    #[tokio::test]
    async fn test_snapshot_requires_voice_channel() {
        let players = new_player_manager();
        let gid = GuildId::new(3);
        queue::enqueue(&players, gid, track("a")).await;
        assert!(snapshot(&players, gid).await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_captures_player() {
        let players = new_player_manager();
        let gid = GuildId::new(3);
        queue::enqueue(&players, gid, track("a")).await;
        queue::enqueue(&players, gid, track("b")).await;
        queue::advance(&players, gid, false).await;
        queue::set_loop_mode(&players, gid, LoopMode::Track).await;
        queue::set_volume(&players, gid, 0.35).await;
        {
            let mut map = players.write().await;
            let p = map.get_mut(&gid).unwrap();
            p.voice_channel = Some(ChannelId::new(30));
            p.text_channel = Some(ChannelId::new(31));
        }

        let state = snapshot(&players, gid).await.unwrap();
        assert_eq!(state.guild_id, 3);
        assert_eq!(state.channel_id, 30);
        assert_eq!(state.text_channel_id, Some(31));
        assert_eq!(state.current.unwrap().title, "a");
        assert_eq!(state.queue.len(), 1);
        assert_eq!(state.loop_mode, LoopMode::Track);
        assert_eq!(state.volume, 35);
    }

    fn track(title: &str) -> Track {
        Track {
            title: title.to_string(),
            author: None,
            uri: format!("https://example.com/{title}"),
            length_secs: Some(100),
            requester_id: None,
            requester_name: String::new(),
        }
    }
}
