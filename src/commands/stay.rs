use poise::CreateReply;

use crate::music::{player, queue};
use crate::utils::embed;
use crate::{Context, Error};

/// Toggles 24/7 mode: with a persistent channel the bot never leaves on its
/// own and rejoins that channel after a restart.
async fn stay_impl(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let db = &ctx.data().db;

    if db.persistent_channel(guild_id.get())?.is_some() {
        db.clear_persistent_channel(guild_id.get())?;
        ctx.say("🚪 24/7 mode disabled. I'll leave when the channel is empty.")
            .await?;
        return Ok(());
    }

    let Some(voice_channel) = player::user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) else {
        ctx.send(CreateReply::default().embed(embed::error("Join the voice channel I should stay in first!")))
            .await?;
        return Ok(());
    };

    let playback = player::connect(
        ctx.serenity_context(),
        ctx.data(),
        guild_id,
        voice_channel,
        ctx.channel_id(),
    )
    .await?;

    playback.save_snapshot().await;
    db.set_persistent_channel(guild_id.get(), voice_channel.get())?;

    let queued = queue::all_tracks(&ctx.data().players, guild_id).await.len();
    ctx.say(format!(
        "📌 24/7 mode enabled. I'll stay in <#{voice_channel}> ({queued} tracks queued)."
    ))
    .await?;

    Ok(())
}

/// Keep the bot in your voice channel around the clock
#[poise::command(slash_command, guild_only)]
pub async fn stay(ctx: Context<'_>) -> Result<(), Error> {
    stay_impl(ctx).await
}
