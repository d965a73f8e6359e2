use poise::CreateReply;

use crate::music::queue as music_queue;
use crate::utils::embed;
use crate::{Context, Error};

async fn queue_impl(ctx: Context<'_>, page: Option<usize>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let (current, tracks) = music_queue::snapshot(&ctx.data().players, guild_id).await;
    let loop_mode = music_queue::loop_mode(&ctx.data().players, guild_id).await;

    let embed = embed::queue_list(current.as_ref(), &tracks, page.unwrap_or(1), loop_mode);
    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Show the queue
#[poise::command(slash_command, guild_only)]
pub async fn queue(
    ctx: Context<'_>,
    #[description = "Page number"] page: Option<usize>,
) -> Result<(), Error> {
    queue_impl(ctx, page).await
}

/// Show the queue (/queue shortcut)
#[poise::command(slash_command, guild_only)]
pub async fn q(
    ctx: Context<'_>,
    #[description = "Page number"] page: Option<usize>,
) -> Result<(), Error> {
    queue_impl(ctx, page).await
}
