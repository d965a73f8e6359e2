use poise::CreateReply;

use crate::music::queue;
use crate::utils::embed;
use crate::{Context, Error};

/// Shared body of /pause and /resume.
async fn toggle_impl(ctx: Context<'_>, pause: bool) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let handle = {
        let players = ctx.data().players.read().await;
        players.get(&guild_id).and_then(|p| p.track_handle.clone())
    };

    let Some(h) = handle else {
        ctx.send(CreateReply::default().embed(embed::error("Nothing is playing right now.")))
            .await?;
        return Ok(());
    };

    if pause {
        h.pause()?;
    } else {
        h.play()?;
    }

    let title = queue::current(&ctx.data().players, guild_id)
        .await
        .map_or_else(|| "unknown".to_string(), |t| t.title);
    if pause {
        ctx.say(format!("⏸️ Paused **{title}**")).await?;
    } else {
        ctx.say(format!("▶️ Resumed **{title}**")).await?;
    }

    Ok(())
}

/// Pause the current track
#[poise::command(slash_command, guild_only)]
pub async fn pause(ctx: Context<'_>) -> Result<(), Error> {
    toggle_impl(ctx, true).await
}

/// Resume the paused track
#[poise::command(slash_command, guild_only)]
pub async fn resume(ctx: Context<'_>) -> Result<(), Error> {
    toggle_impl(ctx, false).await
}
