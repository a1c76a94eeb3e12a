//! Block Slider: a sliding-block puzzle engine and exhaustive solver.
//!
//! Fixed-length rigid blocks slide along their own axis over a grid of
//! walls, floors, and a single exit; the puzzle is solved when a block's
//! trailing edge reaches the exit cell. The solver enumerates *every* way
//! to win within a bounded number of single-cell moves by undo-based
//! backtracking on one shared board.

pub mod board;
pub mod puzzle;
pub mod solver;

// Re-export main types
pub use board::{Board, Cell, Snapshot};
pub use puzzle::{
    Block, CellType, Direction, Move, Orientation, Position, Puzzle, PuzzleError,
};
pub use solver::{Solution, Solver};
