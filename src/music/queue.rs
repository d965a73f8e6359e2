use serenity::model::id::GuildId;

use super::{GuildPlayer, LoopMode, PlayerManager, Track};

pub async fn enqueue(manager: &PlayerManager, guild_id: GuildId, track: Track) -> usize {
    let mut players = manager.write().await;
    let player = players.entry(guild_id).or_default();
    player.queue.push_back(track);
    player.queue.len()
}

/// Advances the player and returns the track that should play next.
///
/// A natural track end repeats the current track in `Track` loop mode; a
/// skip always moves on. In `Queue` loop mode the finished track goes to the
/// back of the queue.
pub async fn advance(manager: &PlayerManager, guild_id: GuildId, skipped: bool) -> Option<Track> {
    let mut players = manager.write().await;
    let player = players.entry(guild_id).or_default();

    if !skipped && player.loop_mode == LoopMode::Track && player.current.is_some() {
        return player.current.clone();
    }

    if player.loop_mode == LoopMode::Queue {
        if let Some(finished) = player.current.take() {
            player.queue.push_back(finished);
        }
    }

    player.current = player.queue.pop_front();
    player.current.clone()
}

/// Replaces the queue with `tracks` (e.g. from a saved playlist). The
/// current track keeps playing.
pub async fn replace(
    manager: &PlayerManager,
    guild_id: GuildId,
    tracks: Vec<Track>,
    playlist_name: Option<String>,
) -> usize {
    let mut players = manager.write().await;
    let player = players.entry(guild_id).or_default();
    player.queue = tracks.into();
    player.playlist_name = playlist_name;
    player.queue.len()
}

pub async fn clear(manager: &PlayerManager, guild_id: GuildId) {
    let mut players = manager.write().await;
    if let Some(player) = players.get_mut(&guild_id) {
        player.queue.clear();
        player.current = None;
        player.track_handle = None;
        player.playlist_name = None;
    }
}

pub async fn snapshot(manager: &PlayerManager, guild_id: GuildId) -> (Option<Track>, Vec<Track>) {
    let players = manager.read().await;
    match players.get(&guild_id) {
        Some(player) => (player.current.clone(), player.queue.iter().cloned().collect()),
        None => (None, vec![]),
    }
}

pub async fn all_tracks(manager: &PlayerManager, guild_id: GuildId) -> Vec<Track> {
    let players = manager.read().await;
    players
        .get(&guild_id)
        .map_or_else(Vec::new, GuildPlayer::all_tracks)
}

pub async fn shuffle(manager: &PlayerManager, guild_id: GuildId) -> usize {
    use rand::seq::SliceRandom;

    let mut players = manager.write().await;
    let player = players.entry(guild_id).or_default();
    let mut tracks: Vec<Track> = player.queue.drain(..).collect();
    tracks.shuffle(&mut rand::thread_rng());
    let len = tracks.len();
    player.queue = tracks.into();
    len
}

/// Removes the 1-based `position` from the queue.
pub async fn remove_at(manager: &PlayerManager, guild_id: GuildId, position: usize) -> Option<Track> {
    let mut players = manager.write().await;
    let player = players.entry(guild_id).or_default();
    if position > 0 && position <= player.queue.len() {
        player.queue.remove(position - 1)
    } else {
        None
    }
}

pub async fn set_loop_mode(manager: &PlayerManager, guild_id: GuildId, mode: LoopMode) {
    let mut players = manager.write().await;
    players.entry(guild_id).or_default().loop_mode = mode;
}

pub async fn loop_mode(manager: &PlayerManager, guild_id: GuildId) -> LoopMode {
    let players = manager.read().await;
    players.get(&guild_id).map_or(LoopMode::Off, |p| p.loop_mode)
}

pub async fn set_volume(manager: &PlayerManager, guild_id: GuildId, volume: f32) {
    let volume = volume.clamp(0.0, 1.0);
    let mut players = manager.write().await;
    let player = players.entry(guild_id).or_default();
    player.volume = volume;
    if let Some(handle) = &player.track_handle {
        let _ = handle.set_volume(volume);
    }
}

pub async fn volume(manager: &PlayerManager, guild_id: GuildId) -> f32 {
    let players = manager.read().await;
    players.get(&guild_id).map_or(1.0, |p| p.volume)
}

pub async fn current(manager: &PlayerManager, guild_id: GuildId) -> Option<Track> {
    let players = manager.read().await;
    players.get(&guild_id).and_then(|p| p.current.clone())
}

pub async fn is_idle(manager: &PlayerManager, guild_id: GuildId) -> bool {
    let players = manager.read().await;
    players.get(&guild_id).map_or(true, GuildPlayer::is_idle)
}
