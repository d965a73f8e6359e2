use chrono::Utc;
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::builder::{CreateAttachment, GetMessages};
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, MessageId};
use tracing::{info, warn};

use crate::export::{ExportFormat, ExportMeta, ExportedMessage, DEFAULT_LIMIT, MAX_LIMIT};
use crate::utils::embed;
use crate::{Context, Error};

/// Discord hands out at most this many messages per request.
const PAGE_SIZE: u32 = 100;

/// Newest first, paging backwards until `limit` messages or the start of the
/// channel.
async fn fetch_history(
    http: &serenity::Http,
    channel_id: ChannelId,
    limit: u32,
) -> Result<Vec<Message>, serenity::Error> {
    let mut messages: Vec<Message> = Vec::new();
    let mut before: Option<MessageId> = None;

    while (messages.len() as u32) < limit {
        let batch = (limit - messages.len() as u32).min(PAGE_SIZE);
        let mut request = GetMessages::new().limit(batch as u8);
        if let Some(id) = before {
            request = request.before(id);
        }

        let page = channel_id.messages(http, request).await?;
        let exhausted = (page.len() as u32) < batch;
        before = page.last().map(|m| m.id);
        messages.extend(page);
        if exhausted || before.is_none() {
            break;
        }
    }

    Ok(messages)
}

async fn extract_impl(
    ctx: Context<'_>,
    channel: Option<serenity::GuildChannel>,
    limit: Option<u32>,
    format: Option<ExportFormat>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let format = format.unwrap_or(ExportFormat::Json);

    if !(1..=MAX_LIMIT).contains(&limit) {
        let message = format!("The limit must be between 1 and {MAX_LIMIT}.");
        ctx.send(CreateReply::default().embed(embed::error(&message)).ephemeral(true))
            .await?;
        return Ok(());
    }

    let (channel_id, channel_name) = match channel {
        Some(ch) if ch.guild_id != guild_id => {
            ctx.send(
                CreateReply::default()
                    .embed(embed::error("That channel belongs to another server."))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
        Some(ch) => (ch.id, ch.name),
        None => {
            let id = ctx.channel_id();
            let name = id.name(ctx.serenity_context()).await.unwrap_or_else(|_| id.to_string());
            (id, name)
        }
    };
    let guild_name = ctx
        .guild()
        .map(|g| g.name.clone())
        .unwrap_or_else(|| guild_id.to_string());

    ctx.defer_ephemeral().await?;

    let history = match fetch_history(&ctx.serenity_context().http, channel_id, limit).await {
        Ok(history) => history,
        Err(e) => {
            warn!("could not read history of {channel_id} in {guild_id}: {e}");
            let message = format!("I couldn't read that channel: {e}");
            ctx.send(CreateReply::default().embed(embed::error(&message)).ephemeral(true))
                .await?;
            return Ok(());
        }
    };
    let messages: Vec<ExportedMessage> = history.iter().map(ExportedMessage::from).collect();

    let meta = ExportMeta {
        guild_id: guild_id.get(),
        guild_name,
        channel_id: channel_id.get(),
        channel_name,
        extracted_at: Utc::now(),
        requested_limit: limit,
    };
    let body = format.render(&meta, &messages)?;
    let file_name = meta.file_name(format);

    info!(
        "{} exported {} message(s) from {channel_id} as {}",
        ctx.author().name,
        messages.len(),
        format.extension()
    );

    let summary = format!(
        "✅ Exported **{}** message(s) from <#{}> as **{}**.",
        messages.len(),
        channel_id,
        format.extension().to_uppercase()
    );
    ctx.send(
        CreateReply::default()
            .content(summary)
            .attachment(CreateAttachment::bytes(body.into_bytes(), file_name))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Export recent messages of a channel as a file
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MANAGE_MESSAGES",
    required_permissions = "MANAGE_MESSAGES"
)]
pub async fn extract(
    ctx: Context<'_>,
    #[description = "Channel to export (defaults to this one)"] channel: Option<serenity::GuildChannel>,
    #[description = "How many messages, newest first (1-1000, default 100)"]
    #[min = 1]
    #[max = 1000]
    limit: Option<u32>,
    #[description = "File format (default json)"] format: Option<ExportFormat>,
) -> Result<(), Error> {
    extract_impl(ctx, channel, limit, format).await
}
