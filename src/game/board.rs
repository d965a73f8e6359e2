//! The 3×3 grid and the result evaluator.

use std::fmt;

use thiserror::Error;

/// A player's mark. `X` always belongs to the player who moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::O => write!(f, "O"),
        }
    }
}

/// A board coordinate. Only valid coordinates can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    row: usize,
    col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < 3 && col < 3).then_some(Self { row, col })
    }

    pub fn row(self) -> usize {
        self.row
    }

    pub fn col(self) -> usize {
        self.col
    }

    /// All nine cells in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..3).flat_map(|row| (0..3).map(move |col| Cell { row, col }))
    }
}

/// Both marks completed a line at once. Legal play can't produce this, so
/// seeing it means a move slipped past validation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("both X and O have a completed line on the same board")]
    ConflictingLines,
}

/// What a board says about the game after a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Continuing,
    Won(Mark),
    Draw,
}

const LINES: [[(usize, usize); 3]; 8] = [
    // rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Mark>; 3]; 3],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cell: Cell) -> Option<Mark> {
        self.cells[cell.row][cell.col]
    }

    pub fn is_empty_at(&self, cell: Cell) -> bool {
        self.get(cell).is_none()
    }

    /// Writes `mark` into an empty cell. Returns `false` and leaves the board
    /// untouched if the cell is already taken.
    pub fn place(&mut self, cell: Cell, mark: Mark) -> bool {
        let slot = &mut self.cells[cell.row][cell.col];
        if slot.is_some() {
            return false;
        }
        *slot = Some(mark);
        true
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// The mark owning a completed line, if any. All eight lines are checked
    /// so a board with lines for both marks is reported instead of guessed.
    pub fn winner(&self) -> Result<Option<Mark>, InvariantViolation> {
        let mut found: Option<Mark> = None;
        for [a, b, c] in LINES {
            let first = self.cells[a.0][a.1];
            if first.is_some() && first == self.cells[b.0][b.1] && first == self.cells[c.0][c.1] {
                match (found, first) {
                    (Some(prev), Some(mark)) if prev != mark => {
                        return Err(InvariantViolation::ConflictingLines)
                    }
                    _ => found = first,
                }
            }
        }
        Ok(found)
    }

    /// Winner is checked before fullness: a last move that completes a line
    /// and fills the board is a win, not a draw.
    pub fn evaluate(&self) -> Result<Verdict, InvariantViolation> {
        if let Some(mark) = self.winner()? {
            return Ok(Verdict::Won(mark));
        }
        if self.filled() == 9 {
            return Ok(Verdict::Draw);
        }
        Ok(Verdict::Continuing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: usize, col: usize) -> Cell {
        Cell::new(row, col).unwrap()
    }

    fn board_from(layout: [&str; 3]) -> Board {
        let mut board = Board::new();
        for (row, line) in layout.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let mark = match ch {
                    'X' => Mark::X,
                    'O' => Mark::O,
                    _ => continue,
                };
                board.place(cell(row, col), mark);
            }
        }
        board
    }

    #[test]
    fn test_cell_bounds() {
        assert!(Cell::new(2, 2).is_some());
        assert!(Cell::new(3, 0).is_none());
        assert!(Cell::new(0, 3).is_none());
        assert_eq!(Cell::all().count(), 9);
    }

    #[test]
    fn test_empty_board_continues() {
        let board = Board::new();
        assert_eq!(board.winner(), Ok(None));
        assert_eq!(board.evaluate(), Ok(Verdict::Continuing));
    }

    #[test]
    fn test_every_line_is_detected() {
        for line in LINES {
            let mut board = Board::new();
            for (row, col) in line {
                board.place(cell(row, col), Mark::O);
            }
            assert_eq!(board.winner(), Ok(Some(Mark::O)), "line {line:?}");
        }
    }

    #[test]
    fn test_place_refuses_occupied_cell() {
        let mut board = Board::new();
        assert!(board.place(cell(1, 1), Mark::X));
        assert!(!board.place(cell(1, 1), Mark::O));
        assert_eq!(board.get(cell(1, 1)), Some(Mark::X));
        assert_eq!(board.filled(), 1);
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let board = board_from(["XOX", "XOO", "OXX"]);
        assert_eq!(board.evaluate(), Ok(Verdict::Draw));
    }

    #[test]
    fn test_win_on_full_board_beats_draw() {
        let board = board_from(["XOX", "OXO", "OXX"]);
        assert_eq!(board.filled(), 9);
        assert_eq!(board.evaluate(), Ok(Verdict::Won(Mark::X)));
    }

    #[test]
    fn test_double_line_for_same_mark_is_a_win() {
        let board = board_from(["XXX", "OXO", "OOX"]);
        assert_eq!(board.winner(), Ok(Some(Mark::X)));
    }

    #[test]
    fn test_conflicting_lines_are_reported() {
        let board = board_from(["XXX", "OOO", "   "]);
        assert_eq!(board.winner(), Err(InvariantViolation::ConflictingLines));
        assert_eq!(board.evaluate(), Err(InvariantViolation::ConflictingLines));
    }
}
