pub mod board;
pub mod registry;
pub mod render;
pub mod session;

pub use board::{Cell, Mark};
pub use registry::{
    ExpiredGame, ExpiryNotifier, GameRegistry, MoveRejected, MoveReport, RegistryError, Session,
};
pub use render::{render, DisplayModel, Phase};
pub use session::{GameSession, MoveError, Outcome, Status};

/// Custom id prefix for board buttons: `ttt:<game_id>:<row>:<col>`.
pub const BUTTON_PREFIX: &str = "ttt";

pub fn button_id(game_id: u64, cell: Cell) -> String {
    format!("{BUTTON_PREFIX}:{game_id}:{}:{}", cell.row(), cell.col())
}

/// Parses a board button id back into the game it belongs to and its cell.
pub fn parse_button_id(custom_id: &str) -> Option<(u64, Cell)> {
    let mut parts = custom_id.split(':');
    if parts.next()? != BUTTON_PREFIX {
        return None;
    }
    let game_id = parts.next()?.parse().ok()?;
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((game_id, Cell::new(row, col)?))
}
