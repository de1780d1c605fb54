//! Property test for spec §8 item 7 ("leap ladder"): `leap_gen` on a
//! level-3 node must agree with 2^(level-2) = 2 generations of a
//! reference, non-wrapping per-cell simulator.
//!
//! The reference stepper's neighbor-counting is grounded in the teacher's
//! `linear.rs` (`LinearLife::tick`/`living_neighbor_count`), simplified to a
//! single finite board with a truncating (non-toroidal) edge, since a
//! HashLife node has no notion of wraparound: cells outside the node simply
//! don't exist.

use hashlife::{Cell, NodeStore, StateMap};
use proptest::prelude::*;

const SIDE: usize = 8;

fn reference_step(board: &[Vec<bool>]) -> Vec<Vec<bool>> {
    let h = board.len() as i32;
    let w = board[0].len() as i32;
    (0..h)
        .map(|r| {
            (0..w)
                .map(|c| {
                    let mut alive_neighbors = 0u8;
                    for dr in -1..=1 {
                        for dc in -1..=1 {
                            if dr == 0 && dc == 0 {
                                continue;
                            }
                            let (rr, cc) = (r + dr, c + dc);
                            if rr >= 0 && rr < h && cc >= 0 && cc < w && board[rr as usize][cc as usize] {
                                alive_neighbors += 1;
                            }
                        }
                    }
                    match (board[r as usize][c as usize], alive_neighbors) {
                        (true, 2) | (true, 3) => true,
                        (false, 3) => true,
                        _ => false,
                    }
                })
                .collect()
        })
        .collect()
}

fn center(board: &[Vec<bool>]) -> Vec<Vec<bool>> {
    let quarter = board.len() / 4;
    board[quarter..3 * quarter]
        .iter()
        .map(|row| row[quarter..3 * quarter].to_vec())
        .collect()
}

proptest! {
    #[test]
    fn leap_gen_matches_two_reference_steps(bits in prop::collection::vec(any::<bool>(), SIDE * SIDE)) {
        let board: Vec<Vec<bool>> = bits.chunks(SIDE).map(|row| row.to_vec()).collect();
        let rows: Vec<Vec<Cell>> = board.iter().map(|row| row.iter().map(|&b| Cell::from(b)).collect()).collect();
        let sm = StateMap::new(3, rows).unwrap();

        let mut store = NodeStore::new();
        let node = store.from_state_map(&sm).unwrap().as_branch().unwrap().clone();
        let leaped = store.leap_gen(&node).unwrap();
        let actual: Vec<Vec<bool>> = leaped
            .as_state_map(None)
            .unwrap()
            .to_rows()
            .iter()
            .map(|row| row.iter().map(|c| c.is_alive()).collect())
            .collect();

        let expected = center(&reference_step(&reference_step(&board)));
        prop_assert_eq!(actual, expected);
    }
}
