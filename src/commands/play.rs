use poise::CreateReply;

use crate::music::{player, queue, source};
use crate::utils::{components, embed};
use crate::{Context, Error};

async fn play_impl(ctx: Context<'_>, query: String) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let Some(voice_channel) = player::user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) else {
        ctx.send(CreateReply::default().embed(embed::error("Join a voice channel first!")))
            .await?;
        return Ok(());
    };

    ctx.defer().await?;

    let mut track = match source::resolve(&query).await {
        Ok(t) => t,
        Err(e) => {
            ctx.send(CreateReply::default().embed(embed::error(&format!("Couldn't find that track: {e}"))))
                .await?;
            return Ok(());
        }
    };
    track.requester_id = Some(ctx.author().id.get());
    track.requester_name = ctx.author().name.clone();

    let playback = player::connect(
        ctx.serenity_context(),
        ctx.data(),
        guild_id,
        voice_channel,
        ctx.channel_id(),
    )
    .await?;

    let position = queue::enqueue(&ctx.data().players, guild_id, track.clone()).await;

    if playback.start_if_idle().await? {
        let (current, upcoming) = queue::snapshot(&ctx.data().players, guild_id).await;
        let now = current.unwrap_or(track);
        ctx.send(
            CreateReply::default()
                .embed(embed::now_playing(&now))
                .components(components::music_components(false, &upcoming)),
        )
        .await?;
    } else {
        playback.save_snapshot().await;
        let (_, upcoming) = queue::snapshot(&ctx.data().players, guild_id).await;
        ctx.send(
            CreateReply::default()
                .embed(embed::added_to_queue(&track, position))
                .components(components::music_components(false, &upcoming)),
        )
        .await?;
    }

    Ok(())
}

/// Play a track or add it to the queue
#[poise::command(slash_command, guild_only)]
pub async fn play(
    ctx: Context<'_>,
    #[description = "Song title or URL"] query: String,
) -> Result<(), Error> {
    play_impl(ctx, query).await
}

/// Play a track or add it to the queue (/play shortcut)
#[poise::command(slash_command, guild_only)]
pub async fn p(
    ctx: Context<'_>,
    #[description = "Song title or URL"] query: String,
) -> Result<(), Error> {
    play_impl(ctx, query).await
}
