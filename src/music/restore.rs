use std::sync::Arc;

use serenity::model::id::{ChannelId, GuildId};
use songbird::Songbird;
use tracing::{info, warn};

use super::player::Playback;
use super::{GuildPlayer, PlayerManager};
use crate::storage::{Database, MusicState};

/// Rebuilds a guild player from a stored snapshot. The interrupted track is
/// put back at the front of the queue so it starts over.
pub fn player_from_state(state: &MusicState, voice_channel: ChannelId) -> GuildPlayer {
    let mut player = GuildPlayer {
        loop_mode: state.loop_mode,
        volume: f32::from(state.volume.min(100)) / 100.0,
        playlist_name: state.playlist_name.clone(),
        voice_channel: Some(voice_channel),
        text_channel: state.text_channel_id.map(ChannelId::new),
        ..GuildPlayer::default()
    };
    player.queue = state.current.iter().chain(state.queue.iter()).cloned().collect();
    player
}

/// Rejoins every guild that has a persistent voice channel and resumes its
/// saved queue. Failures are logged per guild and never stop startup.
pub async fn restore_all(
    manager: &Arc<Songbird>,
    players: &PlayerManager,
    http_client: &reqwest::Client,
    db: &Arc<Database>,
) -> usize {
    let states = match db.all_states() {
        Ok(states) => states,
        Err(e) => {
            warn!("could not read saved music states: {e}");
            return 0;
        }
    };

    let mut restored = 0;
    for state in states {
        let Some(channel) = state.persistent_channel_id.map(ChannelId::new) else {
            continue;
        };
        let guild_id = GuildId::new(state.guild_id);

        let call = match manager.join(guild_id, channel).await {
            Ok(call) => call,
            Err(e) => {
                warn!("could not rejoin {channel} in {guild_id}: {e}");
                continue;
            }
        };

        players
            .write()
            .await
            .insert(guild_id, player_from_state(&state, channel));

        let playback = Playback {
            guild_id,
            players: players.clone(),
            http_client: http_client.clone(),
            db: Arc::clone(db),
            call,
        };
        if let Err(e) = playback.start_if_idle().await {
            warn!("could not resume playback in {guild_id}: {e}");
        }
        restored += 1;
    }

    info!("restored music in {restored} guild(s)");
    restored
}
