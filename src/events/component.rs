use poise::serenity_prelude as serenity;
use serenity::builder::{
    CreateActionRow, CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use serenity::model::application::{ComponentInteraction, ComponentInteractionDataKind};
use serenity::model::id::GuildId;

use crate::commands::{playlist, stop, voicechat};
use crate::music::{player, queue};
use crate::utils::{components, embed};
use crate::{Data, Error};

async fn respond_ephemeral(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    message: &str,
) -> Result<(), Error> {
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .embed(embed::error(message))
            .ephemeral(true),
    );
    interaction.create_response(&ctx.http, response).await?;
    Ok(())
}

async fn update_message(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    embed: CreateEmbed,
    components: Vec<CreateActionRow>,
) -> Result<(), Error> {
    let response = CreateInteractionResponse::UpdateMessage(
        CreateInteractionResponseMessage::new()
            .embed(embed)
            .components(components),
    );
    interaction.create_response(&ctx.http, response).await?;
    Ok(())
}

pub async fn handle(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let custom_id = interaction.data.custom_id.as_str();
    let guild_id = interaction
        .guild_id
        .ok_or("This only works in a server")?;

    if custom_id == "playlist_load" || custom_id.starts_with("playlist_page:") {
        return handle_playlist(ctx, interaction, data, guild_id).await;
    }

    if custom_id == "voice_end" {
        let is_admin = interaction
            .member
            .as_ref()
            .and_then(|m| m.permissions)
            .is_some_and(|p| p.administrator());
        return match voicechat::end_session(ctx, data, guild_id, interaction.user.id, is_admin).await {
            Ok(()) => {
                let e = embed::success("Voice chat ended.");
                update_message(ctx, interaction, e, Vec::new()).await
            }
            Err(e) => respond_ephemeral(ctx, interaction, &e.to_string()).await,
        };
    }

    if custom_id.starts_with("music_") {
        return handle_music(ctx, interaction, data, guild_id).await;
    }

    Ok(())
}

async fn handle_playlist(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    data: &Data,
    guild_id: GuildId,
) -> Result<(), Error> {
    if let Some(page) = interaction.data.custom_id.strip_prefix("playlist_page:") {
        let page = page.parse().unwrap_or(1);
        let (e, rows) = playlist::list_page(data, guild_id, interaction.user.id, page)?;
        return update_message(ctx, interaction, e, rows).await;
    }

    let ComponentInteractionDataKind::StringSelect { values } = &interaction.data.kind else {
        return Ok(());
    };
    let Some(name) = values.first() else {
        return Ok(());
    };

    let Some(voice_channel) = player::user_voice_channel(ctx, guild_id, interaction.user.id) else {
        return respond_ephemeral(ctx, interaction, "Join a voice channel first!").await;
    };

    interaction.defer(&ctx.http).await?;

    let outcome = playlist::load_into_queue(
        ctx,
        data,
        guild_id,
        &interaction.user,
        voice_channel,
        interaction.channel_id,
        name,
    )
    .await?;

    interaction
        .create_followup(
            &ctx.http,
            serenity::CreateInteractionResponseFollowup::new().embed(playlist::load_message(&outcome)),
        )
        .await?;
    Ok(())
}

async fn handle_music(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    data: &Data,
    guild_id: GuildId,
) -> Result<(), Error> {
    let manager = songbird::get(ctx)
        .await
        .ok_or("voice client is not registered")?;

    let bot_channel = {
        let Some(handler_lock) = manager.get(guild_id) else {
            respond_ephemeral(ctx, interaction, "I'm not in a voice channel.").await?;
            return Ok(());
        };
        let handler = handler_lock.lock().await;
        handler.current_channel()
    };

    let user_in_bot_channel = match bot_channel {
        Some(bot_ch) => player::user_voice_channel(ctx, guild_id, interaction.user.id)
            .is_some_and(|ch| ch.get() == bot_ch.0.get()),
        None => false,
    };
    if !user_in_bot_channel {
        respond_ephemeral(ctx, interaction, "You need to be in my voice channel.").await?;
        return Ok(());
    }

    let players = &data.players;

    match interaction.data.custom_id.as_str() {
        "music_pause" | "music_resume" => {
            let pause = interaction.data.custom_id == "music_pause";
            {
                let map = players.read().await;
                if let Some(h) = map.get(&guild_id).and_then(|p| p.track_handle.as_ref()) {
                    let _ = if pause { h.pause() } else { h.play() };
                }
            }

            let (current, upcoming) = queue::snapshot(players, guild_id).await;
            let e = match current {
                Some(track) if pause => embed::now_playing(&track).title("⏸️ Paused"),
                Some(track) => embed::now_playing(&track),
                None => embed::error("Nothing is playing right now."),
            };
            update_message(ctx, interaction, e, components::music_components(pause, &upcoming))
                .await?;
        }
        "music_skip" => {
            let Some(playback) = player::existing(ctx, data, guild_id).await else {
                let e = embed::error("Nothing is playing right now.");
                update_message(ctx, interaction, e, components::music_components_disabled()).await?;
                return Ok(());
            };

            if let Err(e) = playback.play_next(true).await {
                respond_ephemeral(ctx, interaction, &format!("Skip failed: {e}")).await?;
                return Ok(());
            }

            let (current, upcoming) = queue::snapshot(players, guild_id).await;
            let (e, rows) = match current {
                Some(track) => (
                    embed::now_playing(&track),
                    components::music_components(false, &upcoming),
                ),
                None => (
                    CreateEmbed::new()
                        .title("⏭️ Skipped")
                        .description("The queue is empty.")
                        .color(embed::COLOR_INFO),
                    components::music_components_disabled(),
                ),
            };
            update_message(ctx, interaction, e, rows).await?;
        }
        "music_stop" => {
            stop::stop_playback(ctx, data, guild_id).await?;
            let e = CreateEmbed::new()
                .title("⏹️ Stopped")
                .description("Stopped playback and left the channel.")
                .color(embed::COLOR_ERROR);
            update_message(ctx, interaction, e, components::music_components_disabled()).await?;
        }
        "music_queue_select" => {
            // informational dropdown, just refresh
            let is_paused = player::is_paused(players, guild_id).await;
            let (current, upcoming) = queue::snapshot(players, guild_id).await;
            let e = match current {
                Some(track) if is_paused => embed::now_playing(&track).title("⏸️ Paused"),
                Some(track) => embed::now_playing(&track),
                None => embed::error("Nothing is playing right now."),
            };
            update_message(ctx, interaction, e, components::music_components(is_paused, &upcoming))
                .await?;
        }
        _ => {}
    }

    Ok(())
}
