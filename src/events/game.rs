use chrono::Utc;
use poise::serenity_prelude as serenity;
use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::model::application::ComponentInteraction;
use tracing::{error, info};

use crate::game::{self, MoveError, MoveRejected};
use crate::utils::{components, embed};
use crate::{Data, Error};

const NOT_A_PLAYER: &str = "👀 This isn't your game! Start your own with `/ttt`.";
const NOT_YOUR_TURN: &str =
    "⚠️ **Hold on!** It's not your turn yet! Let your opponent make their move first! 🎯";
const CELL_OCCUPIED: &str = "🚫 **Oops!** This cell is already occupied! Choose an empty one! ✨";
const GAME_ENDED: &str = "⌛ This game has already ended.";
const BOARD_BROKEN: &str = "💥 Something went wrong with this board. The game can't continue.";

async fn reject(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    message: &str,
) -> Result<(), Error> {
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(message)
            .ephemeral(true),
    );
    interaction.create_response(&ctx.http, response).await?;
    Ok(())
}

/// A click on a board cell.
pub async fn handle(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some((game_id, cell)) = game::parse_button_id(&interaction.data.custom_id) else {
        return reject(ctx, interaction, GAME_ENDED).await;
    };
    let channel_id = interaction.channel_id;
    let player = interaction.user.id;

    let Some(session) = data.games.get(channel_id, game_id).await else {
        return reject(ctx, interaction, GAME_ENDED).await;
    };
    if !session.is_player(player) {
        return reject(ctx, interaction, NOT_A_PLAYER).await;
    }

    let report = match data.games.submit_move(channel_id, game_id, player, cell).await {
        Ok(report) => report,
        Err(MoveRejected::NoActiveGame | MoveRejected::Move(MoveError::GameAlreadyOver)) => {
            return reject(ctx, interaction, GAME_ENDED).await;
        }
        Err(MoveRejected::Move(MoveError::NotYourTurn)) => {
            return reject(ctx, interaction, NOT_YOUR_TURN).await;
        }
        Err(MoveRejected::Move(MoveError::CellOccupied)) => {
            return reject(ctx, interaction, CELL_OCCUPIED).await;
        }
        Err(e @ MoveRejected::Move(MoveError::Invariant(_))) => {
            error!("game {game_id} in {channel_id} rejected a move: {e}");
            return reject(ctx, interaction, BOARD_BROKEN).await;
        }
    };

    if report.finished {
        info!(
            "game {game_id} in {channel_id} finished: {:?}",
            report.session.status()
        );
    }

    let model = game::render(report.game_id, &report.session, Utc::now());
    let response = CreateInteractionResponse::UpdateMessage(
        CreateInteractionResponseMessage::new()
            .embed(embed::game(&model))
            .components(components::board(&model)),
    );
    interaction.create_response(&ctx.http, response).await?;
    Ok(())
}
