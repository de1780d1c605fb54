//! Errors produced by the HashLife core.
//!
//! All errors here are synchronous, local, and never retried internally;
//! see spec §7 for the kinds this enum implements.

use thiserror::Error;

/// Something went wrong while building or evolving a quadtree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashLifeError {
    /// A `Node` was constructed from children that are not all the same level.
    #[error("inconsistent subnode levels: nw={nw}, ne={ne}, sw={sw}, se={se}")]
    InconsistentLevels {
        nw: usize,
        ne: usize,
        sw: usize,
        se: usize,
    },

    /// `as_state_map` was called with a target whose level doesn't match the node.
    #[error("state map level {target} does not match node level {node}")]
    LevelMismatch { node: usize, target: usize },

    /// `next_gen`/`leap_gen` was called on a node too small to have a centered
    /// inner square (level 1, whose children are bare cells).
    #[error("cannot evolve a level {level} node, minimum is level 2")]
    LevelTooLow { level: usize },

    /// `shrink` was called on a node whose outer ring isn't quiescent, or on a
    /// node too small to have an outer ring at all.
    #[error("cannot shrink: {reason}")]
    CannotShrink { reason: String },

    /// The text codec was given malformed input.
    #[error("malformed text input: {reason}")]
    BadTextInput { reason: String },

    /// The text codec was configured with an unusable marker.
    #[error("invalid marker {marker:?}: must be exactly one character")]
    InvalidMarker { marker: String },
}

/// Shorthand result type used throughout the crate.
pub type Result<T> = std::result::Result<T, HashLifeError>;
