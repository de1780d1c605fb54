//! `NodeStore`: the interning cache and the evolution operations built on it.
//!
//! Grounded on the teacher's `Factory` (`factory.rs`): an owned struct,
//! threaded by `&mut self`, holding the memoization tables that used to be
//! per-level (`cache2x2`, `cache4x4`, `cache_x_`, ...) — generalized here into
//! a single `HashMap` keyed by the four children, since `Child` now carries
//! its own level instead of needing one cache per size. `empty` similarly
//! replaces the teacher's `dead2x2`/`dead4x4` pair with one recursive method.
//!
//! The recursive shape of `next_gen`/`leap_gen` — the nine inner blocks
//! `n00..n22`, the four super-quadrants, the final recursive step — is
//! grounded directly on `examples/original_source/hashlife/core.py`'s `Node`.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::cell::Cell;
use crate::error::{HashLifeError, Result};
use crate::node::{Child, Node};
use crate::rule::RuleSet;
use crate::state_map::StateMap;

type ChildKey = (Child, Child, Child, Child);

/// The interning cache plus the rule a [`NodeStore`] evolves nodes under.
///
/// Unlike the teacher's `Factory`, which only ever ran Conway's Life, the
/// rule is a constructor parameter (spec §9's open question on rule
/// configurability, resolved in [`RuleSet`]). Two stores built with different
/// rules never share nodes — there would be no reason to, since a node's
/// `next_gen`/`leap_gen` memo would be wrong under the other rule.
pub struct NodeStore {
    rule: RuleSet,
    nodes: HashMap<ChildKey, Rc<Node>>,
    empties: Vec<Child>,
}

impl Default for NodeStore {
    fn default() -> Self {
        NodeStore::new()
    }
}

impl NodeStore {
    /// A store that evolves nodes under Conway's Life (B3/S23).
    pub fn new() -> Self {
        NodeStore::with_rule(RuleSet::default())
    }

    /// A store that evolves nodes under an arbitrary birth/survive rule.
    pub fn with_rule(rule: RuleSet) -> Self {
        NodeStore {
            rule,
            nodes: HashMap::new(),
            empties: vec![Child::Leaf(Cell::Dead)],
        }
    }

    /// The rule this store evolves nodes under.
    pub fn rule(&self) -> &RuleSet {
        &self.rule
    }

    /// Intern a node built from four equal-level children, reusing an
    /// existing node if one with the same four children already exists.
    ///
    /// This is the only way a [`Node`] comes into being (`Node::new` is
    /// crate-private for exactly this reason) — it's what makes two
    /// structurally-identical squares the same object (spec §3, §4.1).
    pub fn intern(&mut self, nw: Child, ne: Child, sw: Child, se: Child) -> Result<Rc<Node>> {
        let key = (nw.clone(), ne.clone(), sw.clone(), se.clone());
        if let Some(existing) = self.nodes.get(&key) {
            trace!(level = existing.level, "intern: cache hit");
            return Ok(Rc::clone(existing));
        }
        let node = Rc::new(Node::new(nw, ne, sw, se)?);
        trace!(level = node.level, population = node.population, "intern: cache miss");
        self.nodes.insert(key, Rc::clone(&node));
        Ok(node)
    }

    /// The canonical all-dead child at the given level.
    pub fn empty(&mut self, level: usize) -> Result<Child> {
        while self.empties.len() <= level {
            let next_level = self.empties.len();
            let smaller = self.empties[next_level - 1].clone();
            let node = self.intern(smaller.clone(), smaller.clone(), smaller.clone(), smaller)?;
            self.empties.push(Child::Branch(node));
        }
        Ok(self.empties[level].clone())
    }

    fn branch_of<'a>(child: &'a Child) -> &'a Rc<Node> {
        child
            .as_branch()
            .expect("caller already checked the node's level is high enough")
    }

    /// The level-`ℓ-2` node sitting at the exact center of a level-`ℓ` node.
    ///
    /// Requires `node.level >= 2` — a level-1 node's children are bare
    /// cells, which have no further quadrants to pick a center from.
    pub fn centered_subnode(&mut self, node: &Rc<Node>) -> Result<Rc<Node>> {
        if node.level < 2 {
            return Err(HashLifeError::LevelTooLow { level: node.level });
        }
        let nw = Self::branch_of(&node.nw);
        let ne = Self::branch_of(&node.ne);
        let sw = Self::branch_of(&node.sw);
        let se = Self::branch_of(&node.se);
        self.intern(nw.se.clone(), ne.sw.clone(), sw.ne.clone(), se.nw.clone())
    }

    /// The level-`ℓ` node straddling the seam between `west` and `east`,
    /// itself built from their facing halves.
    ///
    /// `intern` rejects a mismatched pair on our behalf: `west`'s and
    /// `east`'s facing children must be the same level, or the four-way
    /// level check in `Node::new` reports `InconsistentLevels`.
    pub fn centered_horizontal(&mut self, west: &Rc<Node>, east: &Rc<Node>) -> Result<Rc<Node>> {
        self.intern(west.ne.clone(), east.nw.clone(), west.se.clone(), east.sw.clone())
    }

    /// The level-`ℓ` node straddling the seam between `north` and `south`.
    pub fn centered_vertical(&mut self, north: &Rc<Node>, south: &Rc<Node>) -> Result<Rc<Node>> {
        self.intern(north.sw.clone(), north.se.clone(), south.nw.clone(), south.ne.clone())
    }

    /// Embed `node` in the center of a node one level larger, padded with
    /// empty borders on all sides.
    ///
    /// Spreads `node`'s own four children into the innermost corner of each
    /// of the result's four quadrants, each padded with three
    /// `empty(node.level - 1)` siblings — so that a single
    /// [`NodeStore::centered_subnode`] call on the result recovers `node`
    /// exactly (this is `shrink`'s inverse).
    pub fn expand(&mut self, node: &Rc<Node>) -> Result<Rc<Node>> {
        let border = self.empty(node.level.saturating_sub(1))?;
        let nw = self.intern(border.clone(), border.clone(), border.clone(), node.nw.clone())?;
        let ne = self.intern(border.clone(), border.clone(), node.ne.clone(), border.clone())?;
        let sw = self.intern(border.clone(), node.sw.clone(), border.clone(), border.clone())?;
        let se = self.intern(node.se.clone(), border.clone(), border.clone(), border)?;
        self.intern(Child::Branch(nw), Child::Branch(ne), Child::Branch(sw), Child::Branch(se))
    }

    /// The inverse of [`NodeStore::expand`]: strip one level of empty border,
    /// failing if the border isn't actually empty (shrinking would discard
    /// live cells).
    pub fn shrink(&mut self, node: &Rc<Node>) -> Result<Rc<Node>> {
        if node.level < 2 {
            return Err(HashLifeError::CannotShrink {
                reason: format!("level {} node has no outer ring to strip", node.level),
            });
        }
        let nw = Self::branch_of(&node.nw);
        let ne = Self::branch_of(&node.ne);
        let sw = Self::branch_of(&node.sw);
        let se = Self::branch_of(&node.se);
        let ring_is_quiescent = nw.nw.is_empty()
            && nw.ne.is_empty()
            && nw.sw.is_empty()
            && ne.nw.is_empty()
            && ne.ne.is_empty()
            && ne.se.is_empty()
            && sw.nw.is_empty()
            && sw.sw.is_empty()
            && sw.se.is_empty()
            && se.ne.is_empty()
            && se.sw.is_empty()
            && se.se.is_empty();
        if !ring_is_quiescent {
            return Err(HashLifeError::CannotShrink {
                reason: "outer ring has live cells".to_string(),
            });
        }
        self.centered_subnode(node)
    }

    /// Count how many of eight named cells are alive.
    fn count_alive(cells: [Cell; 8]) -> u8 {
        cells.iter().filter(|c| c.is_alive()).count() as u8
    }

    fn leaf(child: &Child) -> Cell {
        child.as_leaf().expect("level-2 node's grandchildren are cells")
    }

    /// `next_gen`'s base case: a level-2 node (a 4x4 square) steps forward
    /// one generation by direct neighbor counting, since its four quadrants
    /// are too small to recurse any further.
    fn base_case_next_gen(&mut self, node: &Rc<Node>) -> Result<Rc<Node>> {
        let nw = Self::branch_of(&node.nw);
        let ne = Self::branch_of(&node.ne);
        let sw = Self::branch_of(&node.sw);
        let se = Self::branch_of(&node.se);

        let nw_alive = Self::count_alive([
            Self::leaf(&nw.nw),
            Self::leaf(&nw.ne),
            Self::leaf(&nw.sw),
            Self::leaf(&ne.nw),
            Self::leaf(&ne.sw),
            Self::leaf(&sw.nw),
            Self::leaf(&sw.ne),
            Self::leaf(&se.nw),
        ]);
        let ne_alive = Self::count_alive([
            Self::leaf(&nw.ne),
            Self::leaf(&nw.se),
            Self::leaf(&ne.nw),
            Self::leaf(&ne.ne),
            Self::leaf(&ne.se),
            Self::leaf(&sw.ne),
            Self::leaf(&se.nw),
            Self::leaf(&se.ne),
        ]);
        let sw_alive = Self::count_alive([
            Self::leaf(&nw.sw),
            Self::leaf(&nw.se),
            Self::leaf(&ne.sw),
            Self::leaf(&sw.nw),
            Self::leaf(&sw.sw),
            Self::leaf(&sw.se),
            Self::leaf(&se.nw),
            Self::leaf(&se.sw),
        ]);
        let se_alive = Self::count_alive([
            Self::leaf(&nw.se),
            Self::leaf(&ne.sw),
            Self::leaf(&ne.se),
            Self::leaf(&sw.ne),
            Self::leaf(&sw.se),
            Self::leaf(&se.ne),
            Self::leaf(&se.sw),
            Self::leaf(&se.se),
        ]);

        let r_nw = self.rule.apply(Self::leaf(&nw.se), nw_alive);
        let r_ne = self.rule.apply(Self::leaf(&ne.sw), ne_alive);
        let r_sw = self.rule.apply(Self::leaf(&sw.ne), sw_alive);
        let r_se = self.rule.apply(Self::leaf(&se.nw), se_alive);

        self.intern(Child::Leaf(r_nw), Child::Leaf(r_ne), Child::Leaf(r_sw), Child::Leaf(r_se))
    }

    /// Advance a node one generation, returning a node one level smaller
    /// (a level-`ℓ` node's center, after one tick, fits in level `ℓ-1`).
    ///
    /// Memoized on the node itself: repeated calls on the same `Rc<Node>`
    /// recompute nothing after the first.
    pub fn next_gen(&mut self, node: &Rc<Node>) -> Result<Rc<Node>> {
        if let Some(cached) = node.cached_next_gen() {
            trace!(level = node.level, "next_gen: memo hit");
            return Ok(cached);
        }
        if node.level < 2 {
            return Err(HashLifeError::LevelTooLow { level: node.level });
        }

        let result = if node.level == 2 {
            self.base_case_next_gen(node)?
        } else {
            let nw = Rc::clone(Self::branch_of(&node.nw));
            let ne = Rc::clone(Self::branch_of(&node.ne));
            let sw = Rc::clone(Self::branch_of(&node.sw));
            let se = Rc::clone(Self::branch_of(&node.se));

            let n00 = self.centered_subnode(&nw)?;
            let horiz_n = self.centered_horizontal(&nw, &ne)?;
            let n01 = self.centered_subnode(&horiz_n)?;
            let n02 = self.centered_subnode(&ne)?;
            let vert_w = self.centered_vertical(&nw, &sw)?;
            let n10 = self.centered_subnode(&vert_w)?;
            let self_center = self.centered_subnode(node)?;
            let n11 = self.centered_subnode(&self_center)?;
            let vert_e = self.centered_vertical(&ne, &se)?;
            let n12 = self.centered_subnode(&vert_e)?;
            let n20 = self.centered_subnode(&sw)?;
            let horiz_s = self.centered_horizontal(&sw, &se)?;
            let n21 = self.centered_subnode(&horiz_s)?;
            let n22 = self.centered_subnode(&se)?;

            let q_nw = self.intern(
                Child::Branch(n00),
                Child::Branch(n01.clone()),
                Child::Branch(n10.clone()),
                Child::Branch(n11.clone()),
            )?;
            let q_ne = self.intern(
                Child::Branch(n01),
                Child::Branch(n02),
                Child::Branch(n11.clone()),
                Child::Branch(n12.clone()),
            )?;
            let q_sw = self.intern(
                Child::Branch(n10),
                Child::Branch(n11.clone()),
                Child::Branch(n20),
                Child::Branch(n21.clone()),
            )?;
            let q_se = self.intern(Child::Branch(n11), Child::Branch(n12), Child::Branch(n21), Child::Branch(n22))?;

            let r_nw = self.next_gen(&q_nw)?;
            let r_ne = self.next_gen(&q_ne)?;
            let r_sw = self.next_gen(&q_sw)?;
            let r_se = self.next_gen(&q_se)?;

            self.intern(Child::Branch(r_nw), Child::Branch(r_ne), Child::Branch(r_sw), Child::Branch(r_se))?
        };

        *node.next_gen.borrow_mut() = Some(Rc::clone(&result));
        Ok(result)
    }

    /// Advance a node `2^(level - 2)` generations — a "leap" — returning a
    /// node one level smaller, same as [`NodeStore::next_gen`].
    ///
    /// Structurally identical to `next_gen`'s recursive case, but every
    /// inner block evolves through time (`leap_gen`) instead of only
    /// re-centering (`centered_subnode`): see
    /// `examples/original_source/hashlife/core.py`'s `Node.leap_gen`.
    pub fn leap_gen(&mut self, node: &Rc<Node>) -> Result<Rc<Node>> {
        if let Some(cached) = node.cached_leap_gen() {
            trace!(level = node.level, "leap_gen: memo hit");
            return Ok(cached);
        }
        if node.level < 2 {
            return Err(HashLifeError::LevelTooLow { level: node.level });
        }

        let result = if node.level == 2 {
            self.base_case_next_gen(node)?
        } else {
            let nw = Rc::clone(Self::branch_of(&node.nw));
            let ne = Rc::clone(Self::branch_of(&node.ne));
            let sw = Rc::clone(Self::branch_of(&node.sw));
            let se = Rc::clone(Self::branch_of(&node.se));

            let n00 = self.leap_gen(&nw)?;
            let horiz_n = self.centered_horizontal(&nw, &ne)?;
            let n01 = self.leap_gen(&horiz_n)?;
            let n02 = self.leap_gen(&ne)?;
            let vert_w = self.centered_vertical(&nw, &sw)?;
            let n10 = self.leap_gen(&vert_w)?;
            let self_center = self.centered_subnode(node)?;
            let n11 = self.leap_gen(&self_center)?;
            let vert_e = self.centered_vertical(&ne, &se)?;
            let n12 = self.leap_gen(&vert_e)?;
            let n20 = self.leap_gen(&sw)?;
            let horiz_s = self.centered_horizontal(&sw, &se)?;
            let n21 = self.leap_gen(&horiz_s)?;
            let n22 = self.leap_gen(&se)?;

            let q_nw = self.intern(
                Child::Branch(n00),
                Child::Branch(n01.clone()),
                Child::Branch(n10.clone()),
                Child::Branch(n11.clone()),
            )?;
            let q_ne = self.intern(
                Child::Branch(n01),
                Child::Branch(n02),
                Child::Branch(n11.clone()),
                Child::Branch(n12.clone()),
            )?;
            let q_sw = self.intern(
                Child::Branch(n10),
                Child::Branch(n11.clone()),
                Child::Branch(n20),
                Child::Branch(n21.clone()),
            )?;
            let q_se = self.intern(Child::Branch(n11), Child::Branch(n12), Child::Branch(n21), Child::Branch(n22))?;

            let r_nw = self.leap_gen(&q_nw)?;
            let r_ne = self.leap_gen(&q_ne)?;
            let r_sw = self.leap_gen(&q_sw)?;
            let r_se = self.leap_gen(&q_se)?;

            self.intern(Child::Branch(r_nw), Child::Branch(r_ne), Child::Branch(r_sw), Child::Branch(r_se))?
        };

        *node.leap_gen.borrow_mut() = Some(Rc::clone(&result));
        Ok(result)
    }

    /// Build (and intern) a `Child` from a `StateMap`, recursing down to
    /// individual cells.
    pub fn from_state_map(&mut self, sm: &StateMap) -> Result<Child> {
        if sm.level() == 0 {
            return Ok(Child::Leaf(sm.val()));
        }
        let nw = self.from_state_map(&sm.nw())?;
        let ne = self.from_state_map(&sm.ne())?;
        let sw = self.from_state_map(&sm.sw())?;
        let se = self.from_state_map(&sm.se())?;
        Ok(Child::Branch(self.intern(nw, ne, sw, se)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(alive: bool) -> Child {
        Child::Leaf(Cell::from(alive))
    }

    fn level1(store: &mut NodeStore, nw: bool, ne: bool, sw: bool, se: bool) -> Rc<Node> {
        store.intern(leaf(nw), leaf(ne), leaf(sw), leaf(se)).unwrap()
    }

    #[test]
    fn intern_reuses_structurally_equal_nodes() {
        let mut store = NodeStore::new();
        let a = level1(&mut store, true, false, false, true);
        let b = level1(&mut store, true, false, false, true);
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn intern_rejects_mismatched_levels() {
        let mut store = NodeStore::new();
        let leaf_child = Child::Leaf(Cell::Dead);
        let branch_child = Child::Branch(level1(&mut store, false, false, false, false));
        let err = store
            .intern(leaf_child, branch_child, Child::Leaf(Cell::Dead), Child::Leaf(Cell::Dead))
            .unwrap_err();
        assert!(matches!(err, HashLifeError::InconsistentLevels { .. }));
    }

    #[test]
    fn empty_towers_share_structure() {
        let mut store = NodeStore::new();
        let e3 = store.empty(3).unwrap();
        let e3_again = store.empty(3).unwrap();
        assert_eq!(e3, e3_again);
        assert!(e3.is_empty());
    }

    #[test]
    fn empty_towers_children_are_the_next_level_down_by_identity() {
        // Spec §8 property 3: for all ℓ >= 1, empty(ℓ)'s four children all
        // equal empty(ℓ-1) -- not just structurally, but as the same object.
        let mut store = NodeStore::new();
        let e2 = store.empty(2).unwrap();
        let e2_branch = e2.as_branch().unwrap();
        let e1 = store.empty(1).unwrap();
        let e1_branch = e1.as_branch().unwrap();
        for child in [&e2_branch.nw, &e2_branch.ne, &e2_branch.sw, &e2_branch.se] {
            assert!(Rc::ptr_eq(child.as_branch().unwrap(), e1_branch));
        }
    }

    #[test]
    fn expand_then_shrink_round_trips_a_quiet_node() {
        let mut store = NodeStore::new();
        let blinker_row = level1(&mut store, false, true, false, true);
        let empty_row = level1(&mut store, false, false, false, false);
        let level2 = store
            .intern(
                Child::Branch(empty_row.clone()),
                Child::Branch(empty_row.clone()),
                Child::Branch(blinker_row.clone()),
                Child::Branch(blinker_row),
            )
            .unwrap();
        let expanded = store.expand(&level2).unwrap();
        let shrunk = store.shrink(&expanded).unwrap();
        assert!(Rc::ptr_eq(&shrunk, &level2));
    }

    #[test]
    fn shrink_fails_on_a_non_quiescent_ring() {
        // Unlike a node produced by `expand` (whose border is always the
        // canonical empty child), this level-3 node is built directly from a
        // quadrant with live cells in every position, including the ones
        // `shrink` treats as "outer ring" — so shrinking it must fail.
        let mut store = NodeStore::new();
        let alive_row = level1(&mut store, true, true, true, true);
        let quad = store
            .intern(
                Child::Branch(alive_row.clone()),
                Child::Branch(alive_row.clone()),
                Child::Branch(alive_row.clone()),
                Child::Branch(alive_row),
            )
            .unwrap();
        let level3 = store
            .intern(
                Child::Branch(quad.clone()),
                Child::Branch(quad.clone()),
                Child::Branch(quad.clone()),
                Child::Branch(quad),
            )
            .unwrap();
        assert!(store.shrink(&level3).is_err());
    }

    #[test]
    fn next_gen_memoizes() {
        let mut store = NodeStore::new();
        let off = level1(&mut store, false, false, false, false);
        let on = level1(&mut store, true, true, true, true);
        let level2 = store
            .intern(Child::Branch(off.clone()), Child::Branch(off.clone()), Child::Branch(off), Child::Branch(on))
            .unwrap();
        let first = store.next_gen(&level2).unwrap();
        assert!(level2.cached_next_gen().is_some());
        let second = store.next_gen(&level2).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }
}
