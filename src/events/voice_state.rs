use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::commands::stop;
use crate::Data;

/// Humans in the bot's current voice channel, or `None` when the bot is not
/// connected in `guild_id`.
async fn listeners(ctx: &serenity::Context, guild_id: serenity::GuildId) -> Option<usize> {
    let manager = songbird::get(ctx).await?;
    let handler_lock = manager.get(guild_id)?;
    let bot_channel = handler_lock.lock().await.current_channel()?;

    let guild = ctx.cache.guild(guild_id)?;
    let count = guild
        .voice_states
        .values()
        .filter(|vs| vs.channel_id.is_some_and(|ch| ch.get() == bot_channel.0.get()))
        .filter(|vs| vs.user_id != ctx.cache.current_user().id)
        .count();
    Some(count)
}

pub async fn handle(
    ctx: &serenity::Context,
    _old: &Option<serenity::VoiceState>,
    new: &serenity::VoiceState,
    data: &Data,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Some(guild_id) = new.guild_id else {
        return Ok(());
    };

    if new.user_id == ctx.cache.current_user().id && new.channel_id.is_none() {
        if crate::voice::discard(&data.voice, guild_id).await.is_some() {
            info!("left voice in {guild_id}, voice chat closed");
        }
        return Ok(());
    }

    if listeners(ctx, guild_id).await != Some(0) {
        return Ok(());
    }

    match data.db.persistent_channel(guild_id.get()) {
        Ok(Some(_)) => return Ok(()),
        Ok(None) => {}
        Err(e) => warn!("could not read 24/7 setting for {guild_id}: {e}"),
    }

    let ctx = ctx.clone();
    let data = data.clone();
    let idle_leave = data.idle_leave;

    tokio::spawn(async move {
        tokio::time::sleep(idle_leave).await;

        // someone may have joined, or 24/7 mode been switched on, meanwhile
        if listeners(&ctx, guild_id).await != Some(0) {
            return;
        }
        if let Ok(Some(_)) = data.db.persistent_channel(guild_id.get()) {
            return;
        }

        info!("alone in voice for {}s, leaving {guild_id}", idle_leave.as_secs());
        if let Err(e) = stop::stop_playback(&ctx, &data, guild_id).await {
            warn!("failed to leave voice in {guild_id}: {e}");
        }
    });

    Ok(())
}
