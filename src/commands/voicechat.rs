use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::model::id::{GuildId, UserId};
use tracing::{info, warn};

use crate::music::player;
use crate::utils::{components, embed};
use crate::voice::{self, tts, VoiceError, VoiceSession};
use crate::{Context, Data, Error};

/// Ends the guild's voice chat on behalf of `user` and leaves voice.
pub async fn end_session(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: GuildId,
    user: UserId,
    is_admin: bool,
) -> Result<(), VoiceError> {
    let session = voice::end(&data.voice, guild_id, user, is_admin).await?;
    info!(
        "voice chat in {guild_id} ended by {user} after {}s",
        (chrono::Utc::now() - session.started_at).num_seconds()
    );

    if let Some(manager) = songbird::get(ctx).await {
        if let Err(e) = manager.remove(guild_id).await {
            warn!("failed to leave voice in {guild_id}: {e}");
        }
    }
    Ok(())
}

async fn voicechat_impl(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let data = ctx.data();

    let Some(voice_channel) = player::user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) else {
        ctx.send(
            CreateReply::default()
                .embed(embed::error("Join a voice channel first!"))
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };

    if data.players.read().await.contains_key(&guild_id) {
        ctx.send(
            CreateReply::default()
                .embed(embed::error("Music is playing in this server. Use /stop first."))
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let session = VoiceSession::new(voice_channel, ctx.channel_id(), ctx.author().id);
    if let Err(e) = voice::begin(&data.voice, guild_id, session).await {
        ctx.send(CreateReply::default().embed(embed::error(&e.to_string())).ephemeral(true))
            .await?;
        return Ok(());
    }

    ctx.defer_ephemeral().await?;

    let manager = songbird::get(ctx.serenity_context())
        .await
        .ok_or("voice client is not registered")?;
    let call = match manager.join(guild_id, voice_channel).await {
        Ok(call) => call,
        Err(e) => {
            voice::discard(&data.voice, guild_id).await;
            warn!("voice chat could not join {voice_channel} in {guild_id}: {e}");
            ctx.send(
                CreateReply::default()
                    .embed(embed::error(&format!("I couldn't join your voice channel: {e}")))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
    };

    info!("{} started a voice chat in {guild_id}", ctx.author().name);

    let how_to = if data.gemini_api_key.is_some() {
        "Type in this channel and I'll answer out loud."
    } else {
        "Type in this channel and I'll read your messages out loud."
    };
    ctx.send(
        CreateReply::default()
            .embed(embed::success(&format!(
                "🎙️ Voice chat started in <#{voice_channel}>.\n{how_to}"
            )))
            .components(vec![components::voice_chat_controls()])
            .ephemeral(true),
    )
    .await?;

    tts::speak(&call, &data.http_client, &data.tts_lang, voice::WELCOME).await;
    voice::record_reply(&data.voice, guild_id, voice::WELCOME).await;
    Ok(())
}

async fn endvoicechat_impl(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let is_admin = ctx
        .author_member()
        .await
        .and_then(|m| m.permissions)
        .is_some_and(|p| p.administrator());

    let reply = match end_session(ctx.serenity_context(), ctx.data(), guild_id, ctx.author().id, is_admin).await {
        Ok(()) => CreateReply::default().embed(embed::success("Voice chat ended.")),
        Err(e) => CreateReply::default().embed(embed::error(&e.to_string())),
    };
    ctx.send(reply.ephemeral(true)).await?;
    Ok(())
}

/// Start a voice chat: type here and the bot speaks in your voice channel
#[poise::command(slash_command, guild_only)]
pub async fn voicechat(ctx: Context<'_>) -> Result<(), Error> {
    voicechat_impl(ctx).await
}

/// End the voice chat
#[poise::command(slash_command, guild_only)]
pub async fn endvoicechat(ctx: Context<'_>) -> Result<(), Error> {
    endvoicechat_impl(ctx).await
}
