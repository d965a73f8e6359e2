use poise::CreateReply;

use crate::music::{player, queue};
use crate::utils::embed;
use crate::{Context, Error};

async fn volume_impl(ctx: Context<'_>, level: u32) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    if level > 100 {
        ctx.send(CreateReply::default().embed(embed::error("Volume must be between 0 and 100.")))
            .await?;
        return Ok(());
    }

    let volume = level as f32 / 100.0;
    queue::set_volume(&ctx.data().players, guild_id, volume).await;
    if let Some(playback) = player::existing(ctx.serenity_context(), ctx.data(), guild_id).await {
        playback.save_snapshot().await;
    }

    ctx.say(format!("🔊 Volume: **{level}%**")).await?;

    Ok(())
}

/// Change the playback volume
#[poise::command(slash_command, guild_only)]
pub async fn volume(
    ctx: Context<'_>,
    #[description = "Volume (0-100)"] level: u32,
) -> Result<(), Error> {
    volume_impl(ctx, level).await
}

/// Change the playback volume (/volume shortcut)
#[poise::command(slash_command, guild_only)]
pub async fn v(
    ctx: Context<'_>,
    #[description = "Volume (0-100)"] level: u32,
) -> Result<(), Error> {
    volume_impl(ctx, level).await
}
