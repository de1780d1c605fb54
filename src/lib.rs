//! A memoized quadtree ("HashLife") core for simulating Conway's Game of
//! Life and other binary outer-totalistic cellular automata.
//!
//! The central types are [`Cell`] (a level-0 leaf), [`Node`] (an interned
//! `2^(level+1)` square built from four equal-level [`Child`]ren), and
//! [`NodeStore`], which owns the interning cache and every operation that
//! needs it: `intern`, `empty`, `centered_subnode`/`centered_horizontal`/
//! `centered_vertical`, `expand`/`shrink`, and the two evolution steps
//! `next_gen`/`leap_gen`. [`StateMap`] and the [`codec`] module handle
//! converting to and from the flat, human-readable row-major form.
//!
//! ```
//! use hashlife::{codec, NodeStore};
//!
//! let mut store = NodeStore::new();
//! let glider = codec::decode("00000000 00100000 00010000 01110000 00000000 00000000 00000000 00000000", "1", "0").unwrap();
//! let node = store.from_state_map(&glider).unwrap().as_branch().unwrap().clone();
//! let next = store.next_gen(&node).unwrap();
//! assert_eq!(next.level, node.level - 1);
//! ```

pub mod cell;
pub mod codec;
pub mod error;
pub mod node;
pub mod rule;
pub mod state_map;
pub mod store;

pub use cell::Cell;
pub use error::{HashLifeError, Result};
pub use node::{Child, Node};
pub use rule::RuleSet;
pub use state_map::StateMap;
pub use store::NodeStore;
