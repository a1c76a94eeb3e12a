//! Depth-bounded exhaustive backtracking search.
//!
//! The solver finds *every* move sequence that drives a board into the
//! terminal state without exceeding the depth bound, not merely a shortest
//! one. It explores by applying a legal move, recursing, and undoing it on
//! one shared board instance, so no per-branch board copies are made.
//! Configurations already on the active path are pruned, which also keeps
//! every recorded solution minimal: search stops at the first terminal
//! state on a path.

use std::collections::HashSet;
use std::fmt::Write as _;

use log::debug;

use crate::board::{Board, Snapshot};
use crate::puzzle::Move;

/// An ordered move sequence that first reaches the terminal state at its
/// last element.
pub type Solution = Vec<Move>;

/// Exhaustive solver with a fixed per-solution move bound.
#[derive(Debug)]
pub struct Solver {
    max_depth: usize,
    solutions: Vec<Solution>,
    on_path: HashSet<Snapshot>,
}

impl Solver {
    /// Create a solver that records every solution of at most `max_depth`
    /// single-cell moves.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            solutions: Vec::new(),
            on_path: HashSet::new(),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Run the full search against `board`, replacing any previously
    /// recorded solutions. The board is mutated freely during exploration
    /// but left exactly as it was found.
    ///
    /// An already-terminal board yields exactly one zero-length solution.
    pub fn solve(&mut self, board: &mut Board) {
        self.solutions.clear();
        self.on_path.clear();
        let mut path = Vec::new();
        self.search(board, &mut path);
        debug!(
            "search complete: {} solution(s) within {} moves",
            self.solutions.len(),
            self.max_depth
        );
    }

    /// The solutions recorded by the last [`Solver::solve`] call, in the
    /// deterministic order the search discovered them.
    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    fn search(&mut self, board: &mut Board, path: &mut Vec<Move>) {
        if board.is_solved() {
            debug!("recorded solution of {} move(s)", path.len());
            self.solutions.push(path.clone());
            return;
        }
        if path.len() == self.max_depth {
            return;
        }

        let here = board.snapshot();
        self.on_path.insert(here.clone());
        for mv in board.legal_moves() {
            board.apply_move(mv);
            // A configuration already on the active path would loop; it
            // stays reachable from other branches.
            if !self.on_path.contains(&board.snapshot()) {
                path.push(mv);
                self.search(board, path);
                path.pop();
            }
            board.undo_last_move();
        }
        self.on_path.remove(&here);
    }

    /// Render the recorded solutions as numbered lines of
    /// `block N <direction>` pairs.
    pub fn format_solutions(&self) -> String {
        let mut out = String::new();
        for (i, solution) in self.solutions.iter().enumerate() {
            if solution.is_empty() {
                let _ = writeln!(out, "Solution {}: already solved", i + 1);
                continue;
            }
            let moves = solution
                .iter()
                .map(Move::to_string)
                .collect::<Vec<String>>()
                .join(", ");
            let _ = writeln!(out, "Solution {}: {moves}", i + 1);
        }
        out
    }

    /// Print the recorded solutions to stdout.
    pub fn print_solutions(&self) {
        print!("{}", self.format_solutions());
    }
}
