use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::builder::EditMessage;
use serenity::http::Http;
use tracing::{info, warn};

use crate::game::{self, ExpiredGame, ExpiryNotifier, RegistryError};
use crate::utils::{components, embed};
use crate::{Context, Error};

/// Edits the board message once a game times out.
struct BoardExpiry {
    http: Arc<Http>,
}

#[async_trait]
impl ExpiryNotifier for BoardExpiry {
    async fn game_expired(&self, expired: ExpiredGame) {
        info!("game {} in {} timed out", expired.game_id, expired.channel_id);
        let Some(message_id) = expired.message_id else {
            return;
        };

        let model = game::render(expired.game_id, &expired.session, Utc::now());
        let edit = EditMessage::new()
            .embed(embed::game(&model))
            .components(components::board(&model));
        if let Err(e) = expired.channel_id.edit_message(&self.http, message_id, edit).await {
            warn!("could not update timed out board {}: {e}", expired.game_id);
        }
    }
}

const SELF_CHALLENGE: &str = "You can't play against yourself! Challenge someone else.";

async fn tictactoe_impl(ctx: Context<'_>, opponent: serenity::User) -> Result<(), Error> {
    let challenger = ctx.author();

    let rejection = if opponent.id == challenger.id {
        Some(SELF_CHALLENGE)
    } else if opponent.bot {
        Some("You can't challenge a bot. Pick a human opponent!")
    } else {
        None
    };
    if let Some(message) = rejection {
        ctx.send(CreateReply::default().embed(embed::error(message)).ephemeral(true))
            .await?;
        return Ok(());
    }

    let registry = &ctx.data().games;
    let notifier: Arc<dyn ExpiryNotifier> = Arc::new(BoardExpiry {
        http: Arc::clone(&ctx.serenity_context().http),
    });

    let (game_id, session) = match registry
        .start(ctx.channel_id(), challenger.id, opponent.id, notifier)
        .await
    {
        Ok(started) => started,
        Err(RegistryError::GameInProgress) => {
            ctx.send(
                CreateReply::default()
                    .embed(embed::error(
                        "A game is already running in this channel. Finish it first!",
                    ))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
        Err(RegistryError::SamePlayer) => {
            ctx.send(CreateReply::default().embed(embed::error(SELF_CHALLENGE)).ephemeral(true))
                .await?;
            return Ok(());
        }
    };

    info!(
        "{} challenged {} to game {game_id} in {}",
        challenger.name,
        opponent.name,
        ctx.channel_id()
    );

    let model = game::render(game_id, &session, Utc::now());
    let reply = ctx
        .send(
            CreateReply::default()
                .content(embed::game_intro(&model, registry.idle_timeout()))
                .embed(embed::game(&model))
                .components(components::board(&model)),
        )
        .await?;

    let message = reply.message().await?;
    registry
        .attach_message(ctx.channel_id(), game_id, message.id)
        .await;

    Ok(())
}

/// Challenge someone to a game of tic-tac-toe
#[poise::command(slash_command, guild_only)]
pub async fn tictactoe(
    ctx: Context<'_>,
    #[description = "Who you want to play against"] opponent: serenity::User,
) -> Result<(), Error> {
    tictactoe_impl(ctx, opponent).await
}

/// Challenge someone to a game of tic-tac-toe (/tictactoe shortcut)
#[poise::command(slash_command, guild_only)]
pub async fn ttt(
    ctx: Context<'_>,
    #[description = "Who you want to play against"] opponent: serenity::User,
) -> Result<(), Error> {
    tictactoe_impl(ctx, opponent).await
}
