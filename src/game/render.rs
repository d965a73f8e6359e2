//! Pure projection of a session into what the chat surface shows.
//!
//! Nothing here talks to Discord; `utils::embed` and `utils::components`
//! turn a [`DisplayModel`] into widgets.

use chrono::{DateTime, Utc};
use serenity::model::id::UserId;

use super::board::{Cell, Mark};
use super::registry::Session;
use super::session::Status;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing { turn: UserId, mark: Mark },
    Won { winner: UserId, loser: UserId, mark: Mark },
    Draw,
    TimedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellView {
    pub cell: Cell,
    pub mark: Option<Mark>,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayModel {
    pub game_id: u64,
    pub player_x: UserId,
    pub player_o: UserId,
    pub phase: Phase,
    /// Row-major, nine entries.
    pub cells: Vec<CellView>,
    pub moves_made: u8,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: i64,
}

impl DisplayModel {
    pub fn is_over(&self) -> bool {
        !matches!(self.phase, Phase::Playing { .. })
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellView]> {
        self.cells.chunks(3)
    }
}

pub fn render(game_id: u64, session: &Session, now: DateTime<Utc>) -> DisplayModel {
    let phase = match session.status() {
        Status::InProgress => Phase::Playing {
            turn: session.current_turn(),
            mark: session.current_mark(),
        },
        Status::WonBy(winner) => {
            let mark = session.mark_of(winner).unwrap_or(Mark::X);
            Phase::Won {
                winner,
                loser: session.player_for(mark.other()),
                mark,
            }
        }
        Status::Draw => Phase::Draw,
        Status::TimedOut => Phase::TimedOut,
    };
    let over = !matches!(phase, Phase::Playing { .. });

    let board = session.board();
    let cells = Cell::all()
        .map(|cell| {
            let mark = board.get(cell);
            CellView {
                cell,
                mark,
                disabled: over || mark.is_some(),
            }
        })
        .collect();

    DisplayModel {
        game_id,
        player_x: session.player_x(),
        player_o: session.player_o(),
        phase,
        cells,
        moves_made: session.moves_made(),
        started_at: session.created_at(),
        elapsed_secs: (now - session.created_at()).num_seconds().max(0),
    }
}
