use poise::serenity_prelude as serenity;
use serenity::model::channel::ReactionType;
use tracing::{info, warn};

use crate::voice::{self, gemini, tts};
use crate::{Data, Error};

const FALLBACK_REPLY: &str = "Sorry, I'm having trouble thinking of an answer right now.";

/// A message typed in a voice chat's text channel. Without an API key the
/// bot reads the message itself out loud.
pub async fn handle(ctx: &serenity::Context, msg: &serenity::Message, data: &Data) -> Result<(), Error> {
    if msg.author.bot {
        return Ok(());
    }
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    let text = msg.content.trim();
    if text.is_empty() {
        return Ok(());
    }

    let Some(context) =
        voice::record_member(&data.voice, guild_id, msg.channel_id, &msg.author.name, text).await
    else {
        return Ok(());
    };

    let Some(call) = songbird::get(ctx).await.and_then(|m| m.get(guild_id)) else {
        warn!("voice chat in {guild_id} has no voice connection, dropping it");
        voice::discard(&data.voice, guild_id).await;
        return Ok(());
    };

    let listening = ReactionType::Unicode("🎙️".to_string());
    if let Err(e) = msg.react(&ctx.http, listening.clone()).await {
        warn!("could not react to {}: {e}", msg.id);
    }

    let reply = match &data.gemini_api_key {
        Some(key) => {
            let _typing = msg.channel_id.start_typing(&ctx.http);
            match gemini::reply(&data.http_client, key, &context).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("voice chat reply failed in {guild_id}: {e}");
                    FALLBACK_REPLY.to_string()
                }
            }
        }
        None => text.to_string(),
    };
    voice::record_reply(&data.voice, guild_id, &reply).await;
    info!("voice chat in {guild_id}: {} said {text:?}, replying {reply:?}", msg.author.name);

    let _ = msg.delete_reaction(&ctx.http, None, listening).await;
    let _ = msg.react(&ctx.http, '✅').await;

    if tts::speak(&call, &data.http_client, &data.tts_lang, &reply).await == 0 {
        warn!("nothing to say for {:?} in {guild_id}", reply);
    }
    Ok(())
}
