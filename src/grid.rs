//! Board storage: blocks and the ROWS x COLS grid that holds settled ones.

use std::fmt;

/// Default board height in cells.
pub const DEFAULT_ROWS: usize = 5;
/// Default board width in cells.
pub const DEFAULT_COLS: usize = 4;

/// Unique, increasing identity of a block within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cell coordinate; row 0 is the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A value tile. `value` is always a power of two, at least 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub value: u32,
    pub row: usize,
    pub col: usize,
}

impl Block {
    pub fn new(id: BlockId, value: u32, row: usize, col: usize) -> Self {
        debug_assert!(value >= 2 && value.is_power_of_two());
        Self { id, value, row, col }
    }

    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// Settled blocks. `cells[row * cols + col]`.
///
/// Every stored block has `row`/`col` equal to the cell it sits in; `set` and
/// `relocate` keep that true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Block>>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        self.in_bounds(row, col).then(|| row * self.cols + col)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&Block> {
        self.index(row, col).and_then(|i| self.cells[i].as_ref())
    }

    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Block> {
        self.index(row, col).and_then(|i| self.cells[i].as_mut())
    }

    /// True if the cell is inside the board and holds nothing.
    #[inline]
    pub fn is_vacant(&self, row: usize, col: usize) -> bool {
        self.index(row, col).is_some_and(|i| self.cells[i].is_none())
    }

    /// Store `cell` at (row, col) and return whatever was there.
    /// A stored block is stamped with the cell's coordinates. Out-of-bounds writes are dropped.
    pub fn set(&mut self, row: usize, col: usize, cell: Option<Block>) -> Option<Block> {
        let Some(i) = self.index(row, col) else {
            return None;
        };
        let cell = cell.map(|mut b| {
            b.row = row;
            b.col = col;
            b
        });
        std::mem::replace(&mut self.cells[i], cell)
    }

    /// Remove and return the block at (row, col).
    #[inline]
    pub fn take(&mut self, row: usize, col: usize) -> Option<Block> {
        self.index(row, col).and_then(|i| self.cells[i].take())
    }

    /// Move the block at `from` into the vacant cell `to`. Returns false (and changes nothing)
    /// if `from` is empty or `to` is occupied / out of bounds.
    pub fn relocate(&mut self, from: Position, to: Position) -> bool {
        if !self.is_vacant(to.row, to.col) {
            return false;
        }
        match self.take(from.row, from.col) {
            Some(block) => {
                self.set(to.row, to.col, Some(block));
                true
            }
            None => false,
        }
    }

    /// Largest value on the board, 0 when empty.
    pub fn max_value(&self) -> u32 {
        self.blocks().map(|b| b.value).max().unwrap_or(0)
    }

    /// Sum of every settled block's value.
    pub fn total_value(&self) -> u64 {
        self.blocks().map(|b| u64::from(b.value)).sum()
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Settled blocks in row-major order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.cells.iter().flatten()
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: u64, value: u32) -> Block {
        Block::new(BlockId(id), value, 0, 0)
    }

    #[test]
    fn test_set_stamps_position() {
        let mut g = Grid::new(5, 4);
        assert!(g.set(3, 2, Some(block(1, 4))).is_none());
        let b = g.get(3, 2).unwrap();
        assert_eq!((b.row, b.col), (3, 2));
        assert!(!g.is_vacant(3, 2));
    }

    #[test]
    fn test_out_of_bounds_is_not_vacant() {
        let g = Grid::new(5, 4);
        assert!(!g.is_vacant(5, 0));
        assert!(!g.is_vacant(0, 4));
        assert!(g.get(9, 9).is_none());
    }

    #[test]
    fn test_relocate_moves_and_restamps() {
        let mut g = Grid::new(5, 4);
        g.set(4, 0, Some(block(1, 2)));
        assert!(g.relocate(Position::new(4, 0), Position::new(4, 1)));
        assert!(g.get(4, 0).is_none());
        assert_eq!(g.get(4, 1).map(Block::position), Some(Position::new(4, 1)));
    }

    #[test]
    fn test_relocate_refuses_occupied_target() {
        let mut g = Grid::new(5, 4);
        g.set(4, 0, Some(block(1, 2)));
        g.set(4, 1, Some(block(2, 8)));
        assert!(!g.relocate(Position::new(4, 0), Position::new(4, 1)));
        assert_eq!(g.get(4, 0).map(|b| b.value), Some(2));
        assert_eq!(g.get(4, 1).map(|b| b.value), Some(8));
    }

    #[test]
    fn test_totals() {
        let mut g = Grid::new(5, 4);
        assert_eq!(g.max_value(), 0);
        assert_eq!(g.total_value(), 0);
        g.set(4, 0, Some(block(1, 2)));
        g.set(4, 1, Some(block(2, 128)));
        g.set(3, 1, Some(block(3, 8)));
        assert_eq!(g.max_value(), 128);
        assert_eq!(g.total_value(), 138);
        assert_eq!(g.occupied(), 3);
        g.clear();
        assert_eq!(g.occupied(), 0);
    }
}
