use poise::CreateReply;

use crate::music::{player, queue};
use crate::utils::embed;
use crate::{Context, Error};

async fn skip_impl(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let playback = player::existing(ctx.serenity_context(), ctx.data(), guild_id).await;
    let current = queue::current(&ctx.data().players, guild_id).await;

    let (Some(playback), Some(track)) = (playback, current) else {
        ctx.send(CreateReply::default().embed(embed::error("Nothing is playing right now.")))
            .await?;
        return Ok(());
    };

    if let Err(e) = playback.play_next(true).await {
        ctx.send(CreateReply::default().embed(embed::error(&format!("Skip failed: {e}"))))
            .await?;
        return Ok(());
    }

    let msg = match queue::current(&ctx.data().players, guild_id).await {
        Some(next) => format!("⏭️ Skipped **{}** → **{}**", track.title, next.title),
        None => format!("⏭️ Skipped **{}** (queue is empty)", track.title),
    };
    ctx.say(msg).await?;

    Ok(())
}

/// Skip the current track
#[poise::command(slash_command, guild_only)]
pub async fn skip(ctx: Context<'_>) -> Result<(), Error> {
    skip_impl(ctx).await
}

/// Skip the current track (/skip shortcut)
#[poise::command(slash_command, guild_only)]
pub async fn s(ctx: Context<'_>) -> Result<(), Error> {
    skip_impl(ctx).await
}
