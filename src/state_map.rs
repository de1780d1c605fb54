//! `StateMap`: a row-major, power-of-two window onto a shared cell grid.
//!
//! This is the neutral external format used to build and inspect `Node`s
//! (spec §3). Grounded on `examples/original_source/hashlife/core.py`'s
//! `StateMap`, whose `_first_half`/`_second_half` slicing this mirrors
//! exactly, adapted to Rust's `Range<usize>` windows over a shared backing
//! grid (spec §9: "sliced views of a shared 2D backing store").

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use crate::cell::Cell;
use crate::error::{HashLifeError, Result};

fn random_cell() -> Cell {
    let mut byte = [0u8; 1];
    getrandom::getrandom(&mut byte).expect("the OS RNG is always available");
    Cell::from(byte[0] % 2 == 1)
}

/// A square, power-of-two view over a shared row-major grid of cells.
///
/// Cloning a `StateMap` is cheap: the backing grid is shared via
/// `Rc<RefCell<_>>`, and quadrant projections (`nw`/`ne`/`sw`/`se`) produce
/// new views over the same grid rather than copies. The grid is mutable
/// through any view — `Node::as_state_map` relies on this to paint a result
/// into a caller-supplied map one quadrant at a time, mirroring how the
/// Python `StateMap`'s slices write through to the same backing list.
#[derive(Clone, Debug)]
pub struct StateMap {
    level: usize,
    rows: Rc<RefCell<Vec<Vec<Cell>>>>,
    // Absent means "the whole grid" (spec §3 invariant).
    window: Option<(Range<usize>, Range<usize>)>,
}

impl StateMap {
    /// Build a `StateMap` over a freshly-owned square grid of side `2^level`.
    pub fn new(level: usize, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let side = 1usize << level;
        if rows.len() != side || rows.iter().any(|row| row.len() != side) {
            return Err(HashLifeError::BadTextInput {
                reason: format!(
                    "expected a {side}x{side} grid for level {level}, got {} rows",
                    rows.len()
                ),
            });
        }
        Ok(StateMap {
            level,
            rows: Rc::new(RefCell::new(rows)),
            window: None,
        })
    }

    /// An all-`Dead` grid of side `2^level`, ready to be painted into by
    /// `Node::as_state_map`.
    pub fn dead(level: usize) -> StateMap {
        let side = 1usize << level;
        StateMap {
            level,
            rows: Rc::new(RefCell::new(vec![vec![Cell::Dead; side]; side])),
            window: None,
        }
    }

    /// A `StateMap` of side `2^level` filled with independently random
    /// cells, useful as a quick fixture for manual exploration.
    ///
    /// Grounded on the teacher's `Factory::rand2x2`/`rand4x4`
    /// (`random_alive_dead_cell`, which reads a byte from `getrandom` and
    /// tests its parity). The `leap_gen` property test builds its own
    /// random boards through `proptest` strategies instead, since proptest
    /// needs to own and shrink the randomness itself.
    pub fn random(level: usize) -> StateMap {
        let side = 1usize << level;
        let rows = (0..side).map(|_| (0..side).map(|_| random_cell()).collect()).collect();
        StateMap {
            level,
            rows: Rc::new(RefCell::new(rows)),
            window: None,
        }
    }

    /// The level of this view; its side length is `2^level`.
    pub fn level(&self) -> usize {
        self.level
    }

    fn row_range(&self) -> Range<usize> {
        self.window
            .as_ref()
            .map(|(r, _)| r.clone())
            .unwrap_or(0..self.rows.len())
    }

    fn col_range(&self) -> Range<usize> {
        self.window
            .as_ref()
            .map(|(_, c)| c.clone())
            .unwrap_or(0..self.rows.len())
    }

    fn first_half(range: &Range<usize>) -> Range<usize> {
        range.start..(range.start + (range.end - range.start) / 2)
    }

    fn second_half(range: &Range<usize>) -> Range<usize> {
        (range.start + (range.end - range.start) / 2)..range.end
    }

    fn quadrant(&self, rows: Range<usize>, cols: Range<usize>) -> StateMap {
        StateMap {
            level: self.level - 1,
            rows: Rc::clone(&self.rows),
            window: Some((rows, cols)),
        }
    }

    /// The northwest quadrant, at `level - 1`.
    pub fn nw(&self) -> StateMap {
        self.quadrant(Self::first_half(&self.row_range()), Self::first_half(&self.col_range()))
    }

    /// The northeast quadrant, at `level - 1`.
    pub fn ne(&self) -> StateMap {
        self.quadrant(Self::first_half(&self.row_range()), Self::second_half(&self.col_range()))
    }

    /// The southwest quadrant, at `level - 1`.
    pub fn sw(&self) -> StateMap {
        self.quadrant(Self::second_half(&self.row_range()), Self::first_half(&self.col_range()))
    }

    /// The southeast quadrant, at `level - 1`.
    pub fn se(&self) -> StateMap {
        self.quadrant(Self::second_half(&self.row_range()), Self::second_half(&self.col_range()))
    }

    /// The single cell in a level-0 (1x1) window.
    ///
    /// Panics if called on a window wider than one cell; callers only ever
    /// reach this after checking `level() == 0` (see `Node::from_state_map`).
    pub fn val(&self) -> Cell {
        assert_eq!(self.level, 0, "val() is only defined for a 1x1 window");
        let row = self.row_range().start;
        let col = self.col_range().start;
        self.rows.borrow()[row][col]
    }

    /// Write a cell at `(row, col)` relative to this window's own origin.
    ///
    /// Used by `Node::as_state_map` to paint a level-1 node's four cells
    /// into whatever quadrant of the overall grid this view happens to be.
    pub(crate) fn write(&self, row: usize, col: usize, cell: Cell) {
        let r = self.row_range().start + row;
        let c = self.col_range().start + col;
        self.rows.borrow_mut()[r][c] = cell;
    }

    /// Materialize this window as an owned grid of cells, row-major.
    ///
    /// Used by the text codec and by tests that need to compare two
    /// `StateMap`s cell-by-cell rather than by identity.
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        let rows = self.rows.borrow();
        self.row_range()
            .map(|r| self.col_range().map(|c| rows[r][c]).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sm(rows: Vec<Vec<Cell>>) -> StateMap {
        let level = (rows.len() as f64).log2() as usize;
        StateMap::new(level, rows).unwrap()
    }

    #[test]
    fn quadrants_of_2x2() {
        use Cell::*;
        let m = sm(vec![vec![Dead, Alive], vec![Alive, Dead]]);
        assert_eq!(m.nw().val(), Dead);
        assert_eq!(m.ne().val(), Alive);
        assert_eq!(m.sw().val(), Alive);
        assert_eq!(m.se().val(), Dead);
    }

    #[test]
    fn rejects_non_square_grid() {
        use Cell::*;
        assert!(StateMap::new(1, vec![vec![Dead, Alive]]).is_err());
    }

    #[test]
    fn to_rows_round_trips() {
        use Cell::*;
        let rows = vec![vec![Dead, Alive], vec![Alive, Dead]];
        let m = sm(rows.clone());
        assert_eq!(m.to_rows(), rows);
    }

    #[test]
    fn random_produces_the_requested_shape() {
        let m = StateMap::random(3);
        assert_eq!(m.level(), 3);
        assert_eq!(m.to_rows().len(), 8);
        assert!(m.to_rows().iter().all(|row| row.len() == 8));
    }

    #[test]
    fn writes_go_through_shared_quadrant_views() {
        let m = StateMap::dead(1);
        m.nw().write(0, 0, Cell::Alive);
        assert_eq!(m.to_rows()[0][0], Cell::Alive);
    }
}
