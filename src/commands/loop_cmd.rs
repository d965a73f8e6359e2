use poise::CreateReply;

use crate::music::{player, queue, LoopMode};
use crate::utils::embed;
use crate::{Context, Error};

async fn loop_impl(ctx: Context<'_>, mode: String) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let Ok(loop_mode) = mode.parse::<LoopMode>() else {
        ctx.send(CreateReply::default().embed(embed::error(
            "Pick a valid mode: `off`, `track` or `queue`",
        )))
        .await?;
        return Ok(());
    };

    queue::set_loop_mode(&ctx.data().players, guild_id, loop_mode).await;
    if let Some(playback) = player::existing(ctx.serenity_context(), ctx.data(), guild_id).await {
        playback.save_snapshot().await;
    }

    let emoji = match loop_mode {
        LoopMode::Off => "➡️",
        LoopMode::Track => "🔂",
        LoopMode::Queue => "🔁",
    };
    ctx.say(format!("{emoji} Loop mode: **{loop_mode}**")).await?;

    Ok(())
}

/// Set the loop mode
#[poise::command(slash_command, guild_only, rename = "loop")]
pub async fn loop_cmd(
    ctx: Context<'_>,
    #[description = "Loop mode (off/track/queue)"] mode: String,
) -> Result<(), Error> {
    loop_impl(ctx, mode).await
}

/// Set the loop mode (/loop shortcut)
#[poise::command(slash_command, guild_only)]
pub async fn l(
    ctx: Context<'_>,
    #[description = "Loop mode (off/track/queue)"] mode: String,
) -> Result<(), Error> {
    loop_impl(ctx, mode).await
}
