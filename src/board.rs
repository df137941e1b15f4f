//! Board state for 3x3 Tic-Tac-Toe
//!
//! A [`Board`] is a small `Copy` value. Applying a move never touches the
//! receiver; it returns a fresh board, so sibling states held by the search
//! can never observe each other's moves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, SearchError};

/// Side length of the board
pub const SIZE: usize = 3;

/// The eight winning lines as (row, col) triples
pub const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// A player's mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The other player's mark
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Mark {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "X" | "x" => Ok(Mark::X),
            "O" | "o" => Ok(Mark::O),
            other => Err(SearchError::InvalidBoard(format!(
                "unknown mark '{}' (expected 'X' or 'O')",
                other
            ))),
        }
    }
}

/// A cell coordinate, ordered row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Flat `0..9` index used by the web front end
    pub fn index(self) -> usize {
        self.row * SIZE + self.col
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index < SIZE * SIZE {
            Some(Position::new(index / SIZE, index % SIZE))
        } else {
            None
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Immutable 3x3 Tic-Tac-Toe position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [[Option<Mark>; SIZE]; SIZE],
}

impl Board {
    /// Creates an empty board
    pub fn new() -> Self {
        Board::default()
    }

    /// Builds a board from a row-major grid
    pub fn from_cells(cells: [[Option<Mark>; SIZE]; SIZE]) -> Self {
        Board { cells }
    }

    /// Builds a board from the front end's flat `[null | "X" | "O"; 9]` layout
    pub fn from_flat(cells: &[Option<Mark>]) -> Result<Self> {
        if cells.len() != SIZE * SIZE {
            return Err(SearchError::InvalidBoard(format!(
                "expected {} cells, got {}",
                SIZE * SIZE,
                cells.len()
            )));
        }
        let mut board = Board::new();
        for (i, cell) in cells.iter().enumerate() {
            board.cells[i / SIZE][i % SIZE] = *cell;
        }
        Ok(board)
    }

    /// Mark at `(row, col)`, `None` when empty or off the board
    pub fn get(&self, row: usize, col: usize) -> Option<Mark> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn cells(&self) -> &[[Option<Mark>; SIZE]; SIZE] {
        &self.cells
    }

    /// Empty cells in row-major order
    pub fn legal_cells(&self) -> Vec<Position> {
        let mut legal = Vec::with_capacity(SIZE * SIZE);
        for row in 0..SIZE {
            for col in 0..SIZE {
                if self.cells[row][col].is_none() {
                    legal.push(Position::new(row, col));
                }
            }
        }
        legal
    }

    pub fn is_legal(&self, pos: Position) -> bool {
        pos.row < SIZE && pos.col < SIZE && self.cells[pos.row][pos.col].is_none()
    }

    /// Whether `mark` holds any complete line
    pub fn is_win(&self, mark: Mark) -> bool {
        LINES
            .iter()
            .any(|line| line.iter().all(|&(r, c)| self.cells[r][c] == Some(mark)))
    }

    /// Full board with no winner
    pub fn is_draw(&self) -> bool {
        self.is_full() && !self.is_win(Mark::X) && !self.is_win(Mark::O)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    pub fn winner(&self) -> Option<Mark> {
        [Mark::X, Mark::O].into_iter().find(|&m| self.is_win(m))
    }

    /// Terminal outcome of this position, if any
    pub fn outcome(&self) -> Option<Outcome> {
        if let Some(mark) = self.winner() {
            Some(Outcome::Win(mark))
        } else if self.is_draw() {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    /// Returns a new board with `mark` placed at `(row, col)`
    pub fn apply(&self, row: usize, col: usize, mark: Mark) -> Result<Board> {
        if row >= SIZE || col >= SIZE {
            return Err(SearchError::InvalidMove {
                row,
                col,
                reason: "out of bounds".to_string(),
            });
        }
        if self.cells[row][col].is_some() {
            return Err(SearchError::InvalidMove {
                row,
                col,
                reason: "cell occupied".to_string(),
            });
        }
        let mut next = *self;
        next.cells[row][col] = Some(mark);
        Ok(next)
    }

    /// Three rows rendered as `"X O -"`, the oracle wire format
    pub fn rows(&self) -> [String; SIZE] {
        let row = |r: usize| {
            self.cells[r]
                .iter()
                .map(|c| c.map_or('-', Mark::as_char).to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        [row(0), row(1), row(2)]
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == Some(mark)).count()
    }
}

/// How a finished position ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win(Mark),
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win(mark) => write!(f, "{}", mark),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  0 1 2")?;
        for (r, row) in self.rows().iter().enumerate() {
            writeln!(f, "{} {}", r, row)?;
        }
        Ok(())
    }
}

/// Parses nine cells, ignoring whitespace and `/` separators.
///
/// `X`/`O` are marks; `-`, `.` and `_` are empty cells.
impl FromStr for Board {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        let mut cells = Vec::with_capacity(SIZE * SIZE);
        for (i, ch) in s.chars().filter(|c| !c.is_whitespace() && *c != '/').enumerate() {
            let cell = match ch {
                'X' | 'x' => Some(Mark::X),
                'O' | 'o' => Some(Mark::O),
                '-' | '.' | '_' => None,
                other => {
                    return Err(SearchError::InvalidBoard(format!(
                        "invalid character '{}' at cell {} in '{}'",
                        other, i, s
                    )))
                }
            };
            cells.push(cell);
        }
        Board::from_flat(&cells)
    }
}
