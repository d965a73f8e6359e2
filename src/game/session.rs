//! One two-player game: turn arbitration and lifecycle.

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use super::board::{Board, Cell, InvariantViolation, Mark, Verdict};

/// Why a move was refused. None of these change the session.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("that cell is already occupied")]
    CellOccupied,
    #[error("the game is already over")]
    GameAlreadyOver,
    #[error("board invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status<P> {
    InProgress,
    WonBy(P),
    Draw,
    TimedOut,
}

impl<P> Status<P> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Result of an accepted move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome<P> {
    Continues { next: P },
    Won(P),
    Draw,
}

#[derive(Clone, Debug)]
pub struct GameSession<P> {
    board: Board,
    /// `players[0]` plays X and moves first, `players[1]` plays O.
    players: [P; 2],
    current: Mark,
    moves_made: u8,
    status: Status<P>,
    created_at: DateTime<Utc>,
}

impl<P: Copy + Eq> GameSession<P> {
    pub fn new(player_x: P, player_o: P) -> Self {
        Self {
            board: Board::new(),
            players: [player_x, player_o],
            current: Mark::X,
            moves_made: 0,
            status: Status::InProgress,
            created_at: Utc::now(),
        }
    }

    /// Starts a game between two participants with X assigned by a fair coin.
    pub fn with_coin_flip<R: Rng + ?Sized>(a: P, b: P, rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> Status<P> {
        self.status
    }

    pub fn moves_made(&self) -> u8 {
        self.moves_made
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn player_x(&self) -> P {
        self.players[0]
    }

    pub fn player_o(&self) -> P {
        self.players[1]
    }

    pub fn current_mark(&self) -> Mark {
        self.current
    }

    pub fn current_turn(&self) -> P {
        self.player_for(self.current)
    }

    pub fn player_for(&self, mark: Mark) -> P {
        match mark {
            Mark::X => self.players[0],
            Mark::O => self.players[1],
        }
    }

    pub fn mark_of(&self, player: P) -> Option<Mark> {
        if player == self.players[0] {
            Some(Mark::X)
        } else if player == self.players[1] {
            Some(Mark::O)
        } else {
            None
        }
    }

    pub fn is_player(&self, player: P) -> bool {
        self.mark_of(player).is_some()
    }

    /// Applies `player`'s move on `cell`.
    ///
    /// Checks run in order: game over, turn, occupancy. The board is
    /// evaluated on a copy, so a rejected move (including an invariant
    /// violation) leaves the session exactly as it was.
    pub fn submit_move(&mut self, player: P, cell: Cell) -> Result<Outcome<P>, MoveError> {
        if self.status.is_terminal() {
            return Err(MoveError::GameAlreadyOver);
        }
        if player != self.current_turn() {
            return Err(MoveError::NotYourTurn);
        }

        let mut next = self.board;
        if !next.place(cell, self.current) {
            return Err(MoveError::CellOccupied);
        }
        let verdict = next.evaluate()?;

        self.board = next;
        self.moves_made += 1;

        let outcome = match verdict {
            Verdict::Won(mark) => {
                let winner = self.player_for(mark);
                self.status = Status::WonBy(winner);
                Outcome::Won(winner)
            }
            Verdict::Draw => {
                self.status = Status::Draw;
                Outcome::Draw
            }
            Verdict::Continuing => {
                self.current = self.current.other();
                Outcome::Continues {
                    next: self.current_turn(),
                }
            }
        };
        Ok(outcome)
    }

    /// Idle-timeout transition. Returns `true` only for the call that actually
    /// retired the game; later or late calls are no-ops.
    pub fn time_out(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = Status::TimedOut;
        true
    }
}
