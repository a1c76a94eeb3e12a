//! Puzzle value types and textual description parsing.
//!
//! A puzzle description is a rectangular grid of single-character cell
//! descriptors, optionally whitespace separated:
//!
//! - `*` wall, `.` floor, `e` exit;
//! - `[` / `]` the ends of a horizontal block, `^` / `v` the ends of a
//!   vertical block, `#` an inner segment between the two ends.
//!
//! Block markers describe something placed *over* a floor cell; the cell
//! underneath is always a floor. Parsing produces the typed grid and block
//! list that [`crate::board::Board`] is constructed from, and all malformed
//! descriptions are rejected here so they never reach the solver.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed type of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Wall,
    Floor,
    Exit,
}

/// The axis a block is locked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Occupies a run of columns; moves left and right.
    Horizontal,
    /// Occupies a run of rows; moves up and down.
    Vertical,
}

/// A single-cell movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Canonical enumeration order used wherever candidate moves are
    /// generated, so that enumeration is deterministic.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The exact geometric inverse of this direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Whether a block of the given orientation can move this way at all.
    pub fn valid_for(self, orientation: Orientation) -> bool {
        match self {
            Direction::Up | Direction::Down => orientation == Orientation::Vertical,
            Direction::Left | Direction::Right => orientation == Orientation::Horizontal,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        })
    }
}

/// A row/column coordinate pair, (0, 0) being the upper-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The adjacent position one cell away in `dir`, or `None` if that
    /// would leave the coordinate space entirely.
    pub fn shifted(self, dir: Direction) -> Option<Position> {
        match dir {
            Direction::Up => self.row.checked_sub(1).map(|row| Position::new(row, self.col)),
            Direction::Down => Some(Position::new(self.row + 1, self.col)),
            Direction::Left => self.col.checked_sub(1).map(|col| Position::new(self.row, col)),
            Direction::Right => Some(Position::new(self.row, self.col + 1)),
        }
    }
}

/// A rigid piece occupying `length` contiguous cells along its orientation
/// axis, starting at `origin` and extending right (horizontal) or down
/// (vertical).
///
/// A block knows nothing about the grid: legality of a movement is entirely
/// the board's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    origin: Position,
    initial_origin: Position,
    length: usize,
    orientation: Orientation,
}

impl Block {
    /// Create a block at the given leading position. Lengths below 1 are
    /// clamped to 1.
    pub fn new(row: usize, col: usize, length: usize, orientation: Orientation) -> Self {
        let origin = Position::new(row, col);
        Self {
            origin,
            initial_origin: origin,
            length: length.max(1),
            orientation,
        }
    }

    /// The current leading (upper/left-most) position.
    pub fn origin(&self) -> Position {
        self.origin
    }

    /// The spawn position the block returns to on [`Block::reset`].
    pub fn initial_origin(&self) -> Position {
        self.initial_origin
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The trailing edge: the last cell of the block along its axis. The
    /// board is solved when this coincides with the exit cell.
    pub fn trailing_edge(&self) -> Position {
        match self.orientation {
            Orientation::Horizontal => {
                Position::new(self.origin.row, self.origin.col + self.length - 1)
            }
            Orientation::Vertical => {
                Position::new(self.origin.row + self.length - 1, self.origin.col)
            }
        }
    }

    /// The positions currently occupied by the block, leading cell first.
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        let origin = self.origin;
        let orientation = self.orientation;
        (0..self.length).map(move |offset| match orientation {
            Orientation::Horizontal => Position::new(origin.row, origin.col + offset),
            Orientation::Vertical => Position::new(origin.row + offset, origin.col),
        })
    }

    /// Displace the origin by one cell. Directions that do not match the
    /// orientation are ignored, as is a shift off the coordinate space.
    pub fn move_toward(&mut self, dir: Direction) {
        if !dir.valid_for(self.orientation) {
            return;
        }
        if let Some(origin) = self.origin.shifted(dir) {
            self.origin = origin;
        }
    }

    /// Restore the origin to the spawn position.
    pub fn reset(&mut self) {
        self.origin = self.initial_origin;
    }
}

/// One single-cell displacement of one block. The block is identified by
/// its index in the board's block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub block: usize,
    pub direction: Direction,
}

impl Move {
    pub fn new(block: usize, direction: Direction) -> Self {
        Self { block, direction }
    }
}

impl fmt::Display for Move {
    /// Renders with a 1-based block identifier, e.g. `block 1 right`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {} {}", self.block + 1, self.direction)
    }
}

/// A malformed puzzle description. These are construction-time failures;
/// a parsed [`Puzzle`] is always well formed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("puzzle description is empty")]
    Empty,
    #[error("row {row} has {found} columns, expected {expected}")]
    NotRectangular {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown symbol '{symbol}' at row {row}, column {col}")]
    UnknownSymbol { symbol: char, row: usize, col: usize },
    #[error("block starting at row {row}, column {col} has no end marker")]
    UnterminatedBlock { row: usize, col: usize },
    #[error("block marker '{symbol}' at row {row}, column {col} is not part of a block")]
    DanglingMarker { symbol: char, row: usize, col: usize },
    #[error("two blocks claim the cell at row {row}, column {col}")]
    OverlappingBlocks { row: usize, col: usize },
    #[error("puzzle has no exit cell")]
    NoExit,
    #[error("puzzle has more than one exit cell")]
    MultipleExits,
}

/// A parsed puzzle description: the cell-type grid plus the block list in
/// row-major discovery order.
#[derive(Debug, Clone)]
pub struct Puzzle {
    grid: Vec<Vec<CellType>>,
    blocks: Vec<Block>,
}

impl Puzzle {
    /// Parse a textual description. The grid must be rectangular, every
    /// block run must be properly delimited, and there must be exactly one
    /// exit cell.
    pub fn parse(text: &str) -> Result<Self, PuzzleError> {
        let rows = description_rows(text)?;
        let grid = grid_from_rows(&rows)?;
        let blocks = blocks_from_rows(&rows)?;

        let exits = grid
            .iter()
            .flatten()
            .filter(|&&c| c == CellType::Exit)
            .count();
        match exits {
            0 => return Err(PuzzleError::NoExit),
            1 => {}
            _ => return Err(PuzzleError::MultipleExits),
        }

        Ok(Self { grid, blocks })
    }

    pub fn grid(&self) -> &[Vec<CellType>] {
        &self.grid
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Consume the puzzle into the pieces a board is built from.
    pub fn into_parts(self) -> (Vec<Vec<CellType>>, Vec<Block>) {
        (self.grid, self.blocks)
    }
}

/// Split the text into rows of single characters, ignoring whitespace and
/// blank lines, and check the result is a non-empty rectangle.
fn description_rows(text: &str) -> Result<Vec<Vec<char>>, PuzzleError> {
    let rows: Vec<Vec<char>> = text
        .lines()
        .map(|line| {
            line.chars()
                .filter(|c| !c.is_whitespace())
                .collect::<Vec<char>>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    if rows.is_empty() {
        return Err(PuzzleError::Empty);
    }
    let expected = rows[0].len();
    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != expected {
            return Err(PuzzleError::NotRectangular {
                row,
                found: cells.len(),
                expected,
            });
        }
    }
    Ok(rows)
}

/// Map each descriptor to a cell type. Block markers sit over floor cells.
fn grid_from_rows(rows: &[Vec<char>]) -> Result<Vec<Vec<CellType>>, PuzzleError> {
    rows.iter()
        .enumerate()
        .map(|(i, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(j, &c)| match c {
                    '*' => Ok(CellType::Wall),
                    'e' => Ok(CellType::Exit),
                    '.' | '[' | ']' | '^' | 'v' | '#' => Ok(CellType::Floor),
                    _ => Err(PuzzleError::UnknownSymbol {
                        symbol: c,
                        row: i,
                        col: j,
                    }),
                })
                .collect()
        })
        .collect()
}

/// Locate every block run. A horizontal block is `[`, zero or more `#`,
/// then `]` in one row; a vertical block is `^`, zero or more `#`, then `v`
/// in one column. Markers that belong to no complete run are rejected, as
/// is any cell claimed by two runs.
fn blocks_from_rows(rows: &[Vec<char>]) -> Result<Vec<Block>, PuzzleError> {
    let height = rows.len();
    let width = rows[0].len();
    let mut blocks = Vec::new();
    let mut used = vec![vec![false; width]; height];

    for i in 0..height {
        for j in 0..width {
            match rows[i][j] {
                '[' => {
                    let mut end = j + 1;
                    while end < width && rows[i][end] == '#' {
                        end += 1;
                    }
                    if end >= width || rows[i][end] != ']' {
                        return Err(PuzzleError::UnterminatedBlock { row: i, col: j });
                    }
                    for col in j..=end {
                        if used[i][col] {
                            return Err(PuzzleError::OverlappingBlocks { row: i, col });
                        }
                        used[i][col] = true;
                    }
                    blocks.push(Block::new(i, j, end - j + 1, Orientation::Horizontal));
                }
                '^' => {
                    let mut end = i + 1;
                    while end < height && rows[end][j] == '#' {
                        end += 1;
                    }
                    if end >= height || rows[end][j] != 'v' {
                        return Err(PuzzleError::UnterminatedBlock { row: i, col: j });
                    }
                    for row in i..=end {
                        if used[row][j] {
                            return Err(PuzzleError::OverlappingBlocks { row, col: j });
                        }
                        used[row][j] = true;
                    }
                    blocks.push(Block::new(i, j, end - i + 1, Orientation::Vertical));
                }
                _ => {}
            }
        }
    }

    for i in 0..height {
        for j in 0..width {
            let c = rows[i][j];
            if matches!(c, ']' | '#' | 'v') && !used[i][j] {
                return Err(PuzzleError::DanglingMarker {
                    symbol: c,
                    row: i,
                    col: j,
                });
            }
        }
    }

    Ok(blocks)
}
