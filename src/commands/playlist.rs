use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::builder::{CreateActionRow, CreateEmbed};
use tracing::info;

use crate::music::{player, queue, Track};
use crate::storage::StorageError;
use crate::utils::embed::PLAYLISTS_PER_PAGE;
use crate::utils::{components, embed};
use crate::{Context, Data, Error};

pub enum LoadOutcome {
    Loaded {
        name: String,
        count: usize,
        /// Set when loading started playback from an idle player.
        started: Option<Track>,
    },
    NotFound,
}

/// Replaces the guild queue with a saved playlist and starts it if nothing
/// is playing. Used by `/playlist load` and the playlist dropdown.
pub async fn load_into_queue(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
    voice_channel: serenity::ChannelId,
    text_channel: serenity::ChannelId,
    name: &str,
) -> Result<LoadOutcome, Error> {
    let Some(playlist) = data.db.load_playlist(guild_id.get(), user.id.get(), name)? else {
        return Ok(LoadOutcome::NotFound);
    };

    let tracks: Vec<Track> = playlist
        .tracks
        .into_iter()
        .map(|mut t| {
            t.requester_id = Some(user.id.get());
            t.requester_name = user.name.clone();
            t
        })
        .collect();

    let playback = player::connect(ctx, data, guild_id, voice_channel, text_channel).await?;
    let count = queue::replace(&data.players, guild_id, tracks, Some(playlist.name.clone())).await;

    let started = if playback.start_if_idle().await? {
        queue::current(&data.players, guild_id).await
    } else {
        playback.save_snapshot().await;
        None
    };

    info!("loaded playlist {} ({count} tracks) in {guild_id}", playlist.name);
    Ok(LoadOutcome::Loaded {
        name: playlist.name,
        count,
        started,
    })
}

/// Embed and navigation rows for one page of a user's playlists.
pub fn list_page(
    data: &Data,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    page: usize,
) -> Result<(CreateEmbed, Vec<CreateActionRow>), Error> {
    let total = data.db.count_playlists(guild_id.get(), user_id.get())?;
    let total_pages = total.div_ceil(PLAYLISTS_PER_PAGE).max(1);
    let page = page.clamp(1, total_pages);

    let summaries = data.db.list_playlists(
        guild_id.get(),
        user_id.get(),
        PLAYLISTS_PER_PAGE,
        (page - 1) * PLAYLISTS_PER_PAGE,
    )?;

    Ok((
        embed::playlist_list(&summaries, total, page),
        components::playlist_components(&summaries, page, total_pages),
    ))
}

pub fn load_message(outcome: &LoadOutcome) -> CreateEmbed {
    match outcome {
        LoadOutcome::Loaded {
            name,
            count,
            started: Some(track),
        } => embed::now_playing(track).title(format!("📂 Loaded {name} ({count} tracks)")),
        LoadOutcome::Loaded { name, count, .. } => embed::success(&format!(
            "📂 Loaded **{name}** into the queue ({count} tracks)."
        )),
        LoadOutcome::NotFound => embed::error("No playlist with that name."),
    }
}

/// Manage your saved playlists
#[poise::command(
    slash_command,
    guild_only,
    subcommands("save", "load", "list", "delete"),
    subcommand_required
)]
pub async fn playlist(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Save the current track and queue as a playlist
#[poise::command(slash_command, guild_only)]
pub async fn save(
    ctx: Context<'_>,
    #[description = "Playlist name"] name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let user_id = ctx.author().id.get();

    let tracks = queue::all_tracks(&ctx.data().players, guild_id).await;
    let existed = ctx
        .data()
        .db
        .load_playlist(guild_id.get(), user_id, &name)?
        .is_some();

    match ctx.data().db.save_playlist(guild_id.get(), user_id, &name, &tracks) {
        Ok(saved) => {
            let verb = if existed { "Updated" } else { "Saved" };
            ctx.send(CreateReply::default().embed(embed::success(&format!(
                "💾 {verb} playlist **{saved}** with {} tracks.",
                tracks.len()
            ))))
            .await?;
        }
        Err(e @ (StorageError::EmptyPlaylist | StorageError::InvalidName)) => {
            ctx.send(
                CreateReply::default()
                    .embed(embed::error(&e.to_string()))
                    .ephemeral(true),
            )
            .await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Replace the queue with a saved playlist
#[poise::command(slash_command, guild_only)]
pub async fn load(
    ctx: Context<'_>,
    #[description = "Playlist name"] name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let Some(voice_channel) = player::user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) else {
        ctx.send(CreateReply::default().embed(embed::error("Join a voice channel first!")))
            .await?;
        return Ok(());
    };

    ctx.defer().await?;

    let outcome = load_into_queue(
        ctx.serenity_context(),
        ctx.data(),
        guild_id,
        ctx.author(),
        voice_channel,
        ctx.channel_id(),
        &name,
    )
    .await?;

    ctx.send(CreateReply::default().embed(load_message(&outcome)))
        .await?;
    Ok(())
}

/// List your saved playlists
#[poise::command(slash_command, guild_only)]
pub async fn list(
    ctx: Context<'_>,
    #[description = "Page number"] page: Option<usize>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let (e, rows) = list_page(ctx.data(), guild_id, ctx.author().id, page.unwrap_or(1))?;
    ctx.send(CreateReply::default().embed(e).components(rows))
        .await?;
    Ok(())
}

/// Delete one of your playlists
#[poise::command(slash_command, guild_only)]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "Playlist name"] name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let reply = if ctx
        .data()
        .db
        .delete_playlist(guild_id.get(), ctx.author().id.get(), &name)?
    {
        embed::success(&format!("🗑️ Deleted playlist **{}**.", name.trim()))
    } else {
        embed::error("No playlist with that name.")
    };
    ctx.send(CreateReply::default().embed(reply)).await?;
    Ok(())
}
