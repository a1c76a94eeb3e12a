//! The mutable board state machine the solver drives.
//!
//! A board owns the cell grid and the block list. Cells carry an optional
//! block *index* rather than a reference, so occupancy is a plain lookup
//! table updated incrementally on every move and undo. All mutation goes
//! through [`Board::apply_move`] and [`Board::undo_last_move`]; illegal
//! requests are ignored rather than treated as errors.

use std::fmt;

use smallvec::SmallVec;

use crate::puzzle::{Block, CellType, Direction, Move, Orientation, Position, Puzzle};

/// A single grid cell: a fixed type plus the index of whichever block
/// currently covers it, if any.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    kind: CellType,
    block: Option<usize>,
}

impl Cell {
    pub fn kind(&self) -> CellType {
        self.kind
    }

    /// Index of the covering block, if any.
    pub fn block(&self) -> Option<usize> {
        self.block
    }

    pub fn has_block(&self) -> bool {
        self.block.is_some()
    }

    pub fn is_wall(&self) -> bool {
        self.kind == CellType::Wall
    }

    pub fn is_exit(&self) -> bool {
        self.kind == CellType::Exit
    }
}

/// A comparable summary of every block's current origin. Two boards with
/// identical snapshots have every block in the same place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot(SmallVec<[Position; 8]>);

/// The board: a rectangular grid of cells, the blocks sliding over them,
/// and the ordered history of applied moves.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Vec<Vec<Cell>>,
    blocks: Vec<Block>,
    history: Vec<Move>,
    total_moves: usize,
    solved: bool,
    exit: Option<Position>,
    grabbed_block: Option<usize>,
    grabbed_cell: Option<Position>,
}

impl Board {
    /// Build a board from a fully-formed cell-type grid and block list.
    /// Occupancy is derived from the block positions; the terminal flag is
    /// evaluated immediately, so a board may be solved at construction.
    pub fn new(grid: Vec<Vec<CellType>>, blocks: Vec<Block>) -> Self {
        let cells = grid
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|kind| Cell { kind, block: None })
                    .collect()
            })
            .collect::<Vec<Vec<Cell>>>();

        let exit = cells.iter().enumerate().find_map(|(i, row)| {
            row.iter()
                .position(|cell| cell.is_exit())
                .map(|j| Position::new(i, j))
        });

        let mut board = Self {
            grid: cells,
            blocks,
            history: Vec::new(),
            total_moves: 0,
            solved: false,
            exit,
            grabbed_block: None,
            grabbed_cell: None,
        };
        board.place_blocks();
        board.solved = board.compute_solved();
        board
    }

    /// Build a board from a parsed puzzle description.
    pub fn from_puzzle(puzzle: Puzzle) -> Self {
        let (grid, blocks) = puzzle.into_parts();
        Self::new(grid, blocks)
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn cols(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    /// Bounds-checked cell lookup.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.get(row).and_then(|cells| cells.get(col))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The exit coordinate, if the grid has one.
    pub fn exit(&self) -> Option<Position> {
        self.exit
    }

    /// Number of moves applied since construction or the last reset.
    pub fn move_count(&self) -> usize {
        self.total_moves
    }

    /// The ordered moves applied to reach the current position.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Whether some block's trailing edge sits on the exit cell.
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// True if a block could be placed over the cell: in bounds, not a
    /// wall, not already occupied.
    pub fn can_place(&self, pos: Position) -> bool {
        match self.cell(pos.row, pos.col) {
            Some(cell) => !cell.is_wall() && !cell.has_block(),
            None => false,
        }
    }

    /// Whether `mv` could be applied right now. Always false once solved.
    pub fn is_legal(&self, mv: Move) -> bool {
        if self.solved {
            return false;
        }
        match self.destination(mv) {
            Some(dest) => self.can_place(dest),
            None => false,
        }
    }

    /// Every currently legal move, freshly computed: blocks in insertion
    /// order, directions in canonical order restricted to the orientation's
    /// valid pair. Empty once the board is solved.
    pub fn legal_moves(&self) -> SmallVec<[Move; 16]> {
        let mut moves = SmallVec::new();
        if self.solved {
            return moves;
        }
        for (idx, block) in self.blocks.iter().enumerate() {
            for dir in Direction::ALL {
                if !dir.valid_for(block.orientation()) {
                    continue;
                }
                let mv = Move::new(idx, dir);
                if self.is_legal(mv) {
                    moves.push(mv);
                }
            }
        }
        moves
    }

    /// Apply a move if it is legal; an illegal move is ignored. Returns
    /// whether the board changed. On success the move is appended to the
    /// history, the counter is bumped, and the terminal flag re-evaluated.
    pub fn apply_move(&mut self, mv: Move) -> bool {
        if !self.is_legal(mv) {
            return false;
        }
        self.shift_block(mv.block, mv.direction);
        self.history.push(mv);
        self.total_moves += 1;
        self.solved = self.compute_solved();
        true
    }

    /// Reverse the most recently applied move by applying its exact
    /// geometric inverse to the block named in the history entry. A no-op
    /// when the history is empty. Returns whether the board changed.
    pub fn undo_last_move(&mut self) -> bool {
        let Some(mv) = self.history.pop() else {
            return false;
        };
        self.shift_block(mv.block, mv.direction.opposite());
        self.total_moves -= 1;
        self.solved = self.compute_solved();
        true
    }

    /// Restore every block to its spawn position, rebuild occupancy from
    /// scratch, and clear the history, counters, selection, and terminal
    /// flag. Cells and blocks are reused, not reallocated.
    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.reset();
        }
        for row in &mut self.grid {
            for cell in row {
                cell.block = None;
            }
        }
        self.place_blocks();
        self.history.clear();
        self.total_moves = 0;
        self.grabbed_block = None;
        self.grabbed_cell = None;
        self.solved = self.compute_solved();
    }

    /// Summarize all block origins for cycle detection.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.blocks.iter().map(Block::origin).collect())
    }

    /// Grab the block covering the given cell, remembering both the block
    /// and the grab point. Empty or out-of-range cells leave the selection
    /// untouched. Interactive convenience only; the solver never selects.
    pub fn grab_at(&mut self, row: usize, col: usize) {
        if let Some(idx) = self.cell(row, col).and_then(Cell::block) {
            self.grabbed_block = Some(idx);
            self.grabbed_cell = Some(Position::new(row, col));
        }
    }

    /// Drop the current selection.
    pub fn release(&mut self) {
        self.grabbed_block = None;
    }

    pub fn grabbed_block(&self) -> Option<usize> {
        self.grabbed_block
    }

    pub fn grabbed_cell(&self) -> Option<Position> {
        self.grabbed_cell
    }

    /// Move the grabbed block one cell, dragging the grab point with it.
    /// A thin wrapper over [`Board::apply_move`].
    pub fn move_grabbed(&mut self, dir: Direction) -> bool {
        let Some(idx) = self.grabbed_block else {
            return false;
        };
        if !self.apply_move(Move::new(idx, dir)) {
            return false;
        }
        if let Some(cell) = self.grabbed_cell {
            self.grabbed_cell = cell.shifted(dir);
        }
        true
    }

    /// Write each block's occupancy into the grid.
    fn place_blocks(&mut self) {
        let Self { grid, blocks, .. } = self;
        for (idx, block) in blocks.iter().enumerate() {
            for pos in block.cells() {
                if let Some(cell) = grid.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
                    cell.block = Some(idx);
                }
            }
        }
    }

    /// The cell a move would newly occupy, bounds-unchecked beyond the
    /// coordinate space itself. `None` when the direction does not match
    /// the block's orientation or the destination underflows.
    fn destination(&self, mv: Move) -> Option<Position> {
        let block = self.blocks.get(mv.block)?;
        if !mv.direction.valid_for(block.orientation()) {
            return None;
        }
        let origin = block.origin();
        match mv.direction {
            Direction::Up | Direction::Left => origin.shifted(mv.direction),
            Direction::Down => Some(Position::new(origin.row + block.length(), origin.col)),
            Direction::Right => Some(Position::new(origin.row, origin.col + block.length())),
        }
    }

    /// Shift a block one cell: set the entered cell, clear the vacated
    /// cell, displace the block. The caller guarantees the shift is
    /// geometrically valid (a legal move or the inverse of one).
    fn shift_block(&mut self, idx: usize, dir: Direction) {
        let Some(block) = self.blocks.get(idx) else {
            return;
        };
        let origin = block.origin();
        let len = block.length();
        let entered = match dir {
            Direction::Up | Direction::Left => origin.shifted(dir),
            Direction::Down => Some(Position::new(origin.row + len, origin.col)),
            Direction::Right => Some(Position::new(origin.row, origin.col + len)),
        };
        let vacated = match dir {
            Direction::Up => Position::new(origin.row + len - 1, origin.col),
            Direction::Left => Position::new(origin.row, origin.col + len - 1),
            Direction::Down | Direction::Right => origin,
        };
        let Some(entered) = entered else {
            return;
        };
        if let Some(cell) = self
            .grid
            .get_mut(entered.row)
            .and_then(|row| row.get_mut(entered.col))
        {
            cell.block = Some(idx);
        }
        if let Some(cell) = self
            .grid
            .get_mut(vacated.row)
            .and_then(|row| row.get_mut(vacated.col))
        {
            cell.block = None;
        }
        self.blocks[idx].move_toward(dir);
    }

    /// Terminal condition: a block's trailing edge coincides with the exit.
    fn compute_solved(&self) -> bool {
        let Some(exit) = self.exit else {
            return false;
        };
        self.blocks.iter().any(|block| block.trailing_edge() == exit)
    }
}

impl fmt::Display for Board {
    /// Renders the board back in the textual description format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.grid.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, cell) in row.iter().enumerate() {
                let c = match cell.block {
                    Some(idx) => {
                        let block = &self.blocks[idx];
                        let here = Position::new(i, j);
                        match block.orientation() {
                            Orientation::Horizontal if here == block.origin() => '[',
                            Orientation::Horizontal if here == block.trailing_edge() => ']',
                            Orientation::Vertical if here == block.origin() => '^',
                            Orientation::Vertical if here == block.trailing_edge() => 'v',
                            _ => '#',
                        }
                    }
                    None => match cell.kind {
                        CellType::Wall => '*',
                        CellType::Floor => '.',
                        CellType::Exit => 'e',
                    },
                };
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Columns 0 and 1 floor, column 2 the exit; one horizontal block of
    /// length 2 over columns 0 and 1.
    fn single_row_board() -> Board {
        Board::from_puzzle(Puzzle::parse("[ ] e").unwrap())
    }

    /// Same row, but the block already sits over columns 1 and 2 at spawn.
    fn presolved_board() -> Board {
        let grid = vec![vec![CellType::Floor, CellType::Floor, CellType::Exit]];
        let blocks = vec![Block::new(0, 1, 2, Orientation::Horizontal)];
        Board::new(grid, blocks)
    }

    #[test]
    fn test_construction_places_blocks() {
        let board = single_row_board();
        assert_eq!(board.rows(), 1);
        assert_eq!(board.cols(), 3);
        assert_eq!(board.cell(0, 0).unwrap().block(), Some(0));
        assert_eq!(board.cell(0, 1).unwrap().block(), Some(0));
        assert_eq!(board.cell(0, 2).unwrap().block(), None);
        assert_eq!(board.exit(), Some(Position::new(0, 2)));
        assert!(!board.is_solved());
    }

    #[test]
    fn test_initial_legal_moves() {
        let board = single_row_board();
        let moves = board.legal_moves();
        assert_eq!(moves.as_slice(), &[Move::new(0, Direction::Right)]);
    }

    #[test]
    fn test_single_move_reaches_exit() {
        let mut board = single_row_board();
        assert!(board.apply_move(Move::new(0, Direction::Right)));
        assert_eq!(board.blocks()[0].origin(), Position::new(0, 1));
        assert_eq!(board.blocks()[0].trailing_edge(), Position::new(0, 2));
        assert!(board.is_solved());
        assert_eq!(board.move_count(), 1);
        assert_eq!(board.history().len(), 1);
        // No legal moves once terminal.
        assert!(board.legal_moves().is_empty());
        assert!(!board.apply_move(Move::new(0, Direction::Left)));
    }

    #[test]
    fn test_illegal_moves_are_ignored() {
        let mut board = single_row_board();
        // Orthogonal to the block's orientation.
        assert!(!board.apply_move(Move::new(0, Direction::Up)));
        // Off the left edge of the grid.
        assert!(!board.apply_move(Move::new(0, Direction::Left)));
        // No such block.
        assert!(!board.apply_move(Move::new(7, Direction::Right)));
        assert_eq!(board.move_count(), 0);
        assert!(board.history().is_empty());
    }

    #[test]
    fn test_apply_then_undo_restores_state() {
        let mut board = single_row_board();
        let before = board.snapshot();
        let history_len = board.history().len();
        let solved = board.is_solved();

        assert!(board.apply_move(Move::new(0, Direction::Right)));
        assert!(board.undo_last_move());

        assert_eq!(board.snapshot(), before);
        assert_eq!(board.history().len(), history_len);
        assert_eq!(board.is_solved(), solved);
        assert_eq!(board.cell(0, 0).unwrap().block(), Some(0));
        assert_eq!(board.cell(0, 2).unwrap().block(), None);
    }

    #[test]
    fn test_undo_with_empty_history_is_noop() {
        let mut board = single_row_board();
        assert!(!board.undo_last_move());
        assert_eq!(board.move_count(), 0);
    }

    #[test]
    fn test_undo_reverses_named_block_not_selection() {
        let mut board = Board::from_puzzle(Puzzle::parse("[ ] e\n[ ] .").unwrap());
        assert!(board.apply_move(Move::new(1, Direction::Right)));
        // Selection points at a different block; undo must ignore it.
        board.grab_at(0, 0);
        assert!(board.undo_last_move());
        assert_eq!(board.blocks()[1].origin(), Position::new(1, 0));
        assert_eq!(board.blocks()[0].origin(), Position::new(0, 0));
    }

    #[test]
    fn test_walls_bound_movement() {
        let mut board = Board::from_puzzle(
            Puzzle::parse(
                "* * * *\n\
                 * ^ . e\n\
                 * v . *\n\
                 * * * *",
            )
            .unwrap(),
        );
        // The vertical block is fenced in above and below.
        assert!(!board.apply_move(Move::new(0, Direction::Up)));
        assert!(!board.apply_move(Move::new(0, Direction::Down)));
        assert!(board.legal_moves().is_empty());
        assert!(!board.is_solved());
    }

    #[test]
    fn test_presolved_board_is_terminal_at_construction() {
        let board = presolved_board();
        assert!(board.is_solved());
        assert!(board.legal_moves().is_empty());
    }

    #[test]
    fn test_reset_restores_spawn_configuration() {
        let mut board = Board::from_puzzle(Puzzle::parse("[ ] . e").unwrap());
        let spawn = board.snapshot();
        assert!(board.apply_move(Move::new(0, Direction::Right)));
        assert!(board.apply_move(Move::new(0, Direction::Right)));
        assert!(board.is_solved());

        board.reset();
        assert_eq!(board.snapshot(), spawn);
        assert!(!board.is_solved());
        assert_eq!(board.move_count(), 0);
        assert!(board.history().is_empty());
        assert_eq!(board.cell(0, 0).unwrap().block(), Some(0));
        assert_eq!(board.cell(0, 2).unwrap().block(), None);
        assert_eq!(board.cell(0, 3).unwrap().block(), None);
    }

    #[test]
    fn test_reset_of_presolved_board_stays_terminal() {
        let mut board = presolved_board();
        board.reset();
        assert!(board.is_solved());
    }

    #[test]
    fn test_grab_and_move_grabbed() {
        let mut board = single_row_board();
        // Grabbing an empty cell selects nothing.
        board.grab_at(0, 2);
        assert_eq!(board.grabbed_block(), None);
        assert!(!board.move_grabbed(Direction::Right));

        board.grab_at(0, 1);
        assert_eq!(board.grabbed_block(), Some(0));
        assert_eq!(board.grabbed_cell(), Some(Position::new(0, 1)));

        assert!(board.move_grabbed(Direction::Right));
        assert_eq!(board.blocks()[0].origin(), Position::new(0, 1));
        // The grab point is dragged along with the block.
        assert_eq!(board.grabbed_cell(), Some(Position::new(0, 2)));

        board.release();
        assert_eq!(board.grabbed_block(), None);
    }

    #[test]
    fn test_snapshot_distinguishes_positions() {
        let mut board = Board::from_puzzle(Puzzle::parse("[ ] . e").unwrap());
        let start = board.snapshot();
        assert!(board.apply_move(Move::new(0, Direction::Right)));
        let moved = board.snapshot();
        assert_ne!(start, moved);
        assert!(board.undo_last_move());
        assert_eq!(board.snapshot(), start);
    }

    #[test]
    fn test_display_round_trips() {
        let board = Board::from_puzzle(
            Puzzle::parse(
                "* * * * *\n\
                 * [ # ] e\n\
                 * . ^ . *\n\
                 * . v . *\n\
                 * * * * *",
            )
            .unwrap(),
        );
        let rendered = board.to_string();
        assert_eq!(
            rendered,
            "*****\n*[#]e\n*.^.*\n*.v.*\n*****"
        );
        let reparsed = Board::from_puzzle(Puzzle::parse(&rendered).unwrap());
        assert_eq!(reparsed.snapshot(), board.snapshot());
    }
}
