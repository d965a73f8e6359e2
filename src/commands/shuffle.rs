use poise::CreateReply;

use crate::music::queue;
use crate::utils::embed;
use crate::{Context, Error};

async fn shuffle_impl(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let count = queue::shuffle(&ctx.data().players, guild_id).await;

    if count == 0 {
        ctx.send(CreateReply::default().embed(embed::error("The queue is empty.")))
            .await?;
    } else {
        ctx.say(format!("🔀 Shuffled {count} tracks.")).await?;
    }

    Ok(())
}

/// Shuffle the queue
#[poise::command(slash_command, guild_only)]
pub async fn shuffle(ctx: Context<'_>) -> Result<(), Error> {
    shuffle_impl(ctx).await
}

/// Shuffle the queue (/shuffle shortcut)
#[poise::command(slash_command, guild_only)]
pub async fn sh(ctx: Context<'_>) -> Result<(), Error> {
    shuffle_impl(ctx).await
}
