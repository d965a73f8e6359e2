use poise::serenity_prelude as serenity;
use poise::CreateReply;
use tracing::{info, warn};

use crate::utils::embed;
use crate::{Context, Data, Error};

/// Drops the guild's player, forgets its saved playback and leaves voice.
/// Returns `false` when the bot was not connected.
pub async fn stop_playback(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
) -> Result<bool, Error> {
    let manager = songbird::get(ctx)
        .await
        .ok_or("voice client is not registered")?;
    if manager.get(guild_id).is_none() {
        return Ok(false);
    }

    data.players.write().await.remove(&guild_id);
    if let Err(e) = data.db.clear_playback(guild_id.get()) {
        warn!("failed to clear saved music state for {guild_id}: {e}");
    }
    manager.remove(guild_id).await?;
    info!("stopped playback in {guild_id}");
    Ok(true)
}

async fn stop_impl(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    if stop_playback(ctx.serenity_context(), ctx.data(), guild_id).await? {
        ctx.say("⏹️ Stopped playback and left the channel.").await?;
    } else {
        ctx.send(CreateReply::default().embed(embed::error("Nothing is playing right now.")))
            .await?;
    }

    Ok(())
}

/// Stop playback and leave the voice channel
#[poise::command(slash_command, guild_only)]
pub async fn stop(ctx: Context<'_>) -> Result<(), Error> {
    stop_impl(ctx).await
}

/// Stop playback and leave the voice channel (/stop shortcut)
#[poise::command(slash_command, guild_only)]
pub async fn st(ctx: Context<'_>) -> Result<(), Error> {
    stop_impl(ctx).await
}
