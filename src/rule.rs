//! The binary outer-totalistic birth/survive rule (spec §4.2).

use crate::cell::Cell;

/// A birth/survive rule over neighbor counts `0..=8`.
///
/// Defaults to Conway's Life (B3/S23). Unlike the teacher's
/// `automata::simb3s23`, which hardcodes the rule, a `RuleSet` is a plain
/// constructor argument — spec §9's open question on rule configurability
/// resolved in favor of an explicit value over a class attribute.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleSet {
    birth: [bool; 9],
    survive: [bool; 9],
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::life()
    }
}

impl RuleSet {
    /// Build a rule from explicit birth/survive neighbor counts. Counts
    /// outside `0..=8` are ignored, since a cell never has more than 8
    /// Moore neighbors.
    pub fn new(birth: impl IntoIterator<Item = u8>, survive: impl IntoIterator<Item = u8>) -> Self {
        let mut rule = RuleSet {
            birth: [false; 9],
            survive: [false; 9],
        };
        for n in birth {
            if (n as usize) < rule.birth.len() {
                rule.birth[n as usize] = true;
            }
        }
        for n in survive {
            if (n as usize) < rule.survive.len() {
                rule.survive[n as usize] = true;
            }
        }
        rule
    }

    /// Conway's Game of Life: born on 3 neighbors, survives on 2 or 3.
    pub fn life() -> Self {
        RuleSet::new([3], [2, 3])
    }

    /// Apply the rule to a cell given how many of its 8 neighbors are alive.
    ///
    /// `neighbors_alive` must be in `0..=8`; this is guaranteed by
    /// construction everywhere the rule is invoked (the level-2 base case
    /// always counts exactly 8 Moore neighbors).
    pub fn apply(&self, cell: Cell, neighbors_alive: u8) -> Cell {
        let table = if cell.is_alive() { &self.survive } else { &self.birth };
        Cell::from(table[neighbors_alive as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birth_rule() {
        let rule = RuleSet::life();
        assert_eq!(rule.apply(Cell::Dead, 3), Cell::Alive);
        for n in [0, 1, 2, 4, 5, 6, 7, 8] {
            assert_eq!(rule.apply(Cell::Dead, n), Cell::Dead, "n={n}");
        }
    }

    #[test]
    fn survive_rule() {
        let rule = RuleSet::life();
        for n in [2, 3] {
            assert_eq!(rule.apply(Cell::Alive, n), Cell::Alive, "n={n}");
        }
        for n in [0, 1, 4, 5, 6, 7, 8] {
            assert_eq!(rule.apply(Cell::Alive, n), Cell::Dead, "n={n}");
        }
    }

    #[test]
    fn custom_rule() {
        // HighLife: B36/S23
        let rule = RuleSet::new([3, 6], [2, 3]);
        assert_eq!(rule.apply(Cell::Dead, 6), Cell::Alive);
        assert_eq!(rule.apply(Cell::Dead, 5), Cell::Dead);
    }

    #[test]
    fn out_of_range_counts_are_ignored() {
        let rule = RuleSet::new([3, 20], [2, 3]);
        assert_eq!(rule.apply(Cell::Dead, 3), Cell::Alive);
    }
}
