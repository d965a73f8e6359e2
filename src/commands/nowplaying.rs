use poise::CreateReply;

use crate::music::{player, queue};
use crate::utils::{components, embed};
use crate::{Context, Error};

async fn nowplaying_impl(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let players = &ctx.data().players;

    let Some(track) = queue::current(players, guild_id).await else {
        ctx.send(CreateReply::default().embed(embed::error("Nothing is playing right now.")))
            .await?;
        return Ok(());
    };

    let loop_mode = queue::loop_mode(players, guild_id).await;
    let volume = queue::volume(players, guild_id).await;
    let playlist = players
        .read()
        .await
        .get(&guild_id)
        .and_then(|p| p.playlist_name.clone());

    let mut e = embed::now_playing(&track)
        .field("Loop", loop_mode.to_string(), true)
        .field("Volume", format!("{}%", (volume * 100.0).round() as u32), true);
    if let Some(name) = playlist {
        e = e.field("Playlist", name, true);
    }

    let is_paused = player::is_paused(players, guild_id).await;
    let (_, upcoming) = queue::snapshot(players, guild_id).await;

    ctx.send(
        CreateReply::default()
            .embed(e)
            .components(components::music_components(is_paused, &upcoming)),
    )
    .await?;

    Ok(())
}

/// Show the track that is playing
#[poise::command(slash_command, guild_only)]
pub async fn nowplaying(ctx: Context<'_>) -> Result<(), Error> {
    nowplaying_impl(ctx).await
}

/// Show the track that is playing (/nowplaying shortcut)
#[poise::command(slash_command, guild_only)]
pub async fn np(ctx: Context<'_>) -> Result<(), Error> {
    nowplaying_impl(ctx).await
}
