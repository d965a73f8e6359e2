use poise::CreateReply;

use crate::music::queue;
use crate::utils::embed;
use crate::{Context, Error};

async fn remove_impl(ctx: Context<'_>, position: usize) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    match queue::remove_at(&ctx.data().players, guild_id, position).await {
        Some(track) => {
            ctx.say(format!("🗑️ Removed **{}** (#{position})", track.title))
                .await?;
        }
        None => {
            ctx.send(
                CreateReply::default()
                    .embed(embed::error(&format!("There is no track at #{position}."))),
            )
            .await?;
        }
    }

    Ok(())
}

/// Remove a track from the queue
#[poise::command(slash_command, guild_only)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Queue position of the track"] position: usize,
) -> Result<(), Error> {
    remove_impl(ctx, position).await
}

/// Remove a track from the queue (/remove shortcut)
#[poise::command(slash_command, guild_only)]
pub async fn rm(
    ctx: Context<'_>,
    #[description = "Queue position of the track"] position: usize,
) -> Result<(), Error> {
    remove_impl(ctx, position).await
}
