//! Row-major text codec (spec §6): turning ASCII art into a [`StateMap`] and
//! back.
//!
//! Grounded on `examples/original_source/hashlife/io.py`'s
//! `str_to_state_map`/`state_map_to_str`, whose validation order (empty
//! input, marker shape, perfect square, power-of-two side) this follows
//! exactly. The teacher's `rle_loader.rs` is out of scope here (spec §1
//! Non-goals exclude pattern-file formats), but its `regex` + `itertools`
//! combination is the idiom this borrows for stripping formatting
//! whitespace and chunking cells into rows.

use itertools::Itertools;
use regex::Regex;

use crate::cell::Cell;
use crate::error::{HashLifeError, Result};
use crate::state_map::StateMap;

/// The conventional marker for a live cell.
pub const DEFAULT_ALIVE: &str = "1";
/// The conventional marker for a dead cell.
pub const DEFAULT_DEAD: &str = "0";

fn single_char(marker: &str) -> Result<char> {
    let mut chars = marker.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(HashLifeError::InvalidMarker {
            marker: marker.to_string(),
        }),
    }
}

/// Parse ASCII art into a `StateMap`.
///
/// Any character that isn't `alive_marker` or `dead_marker` — whitespace
/// used to group rows for readability, for instance — is discarded before
/// the remaining markers are checked for shape. `alive_marker` and
/// `dead_marker` must each be exactly one character.
pub fn decode(text: &str, alive_marker: &str, dead_marker: &str) -> Result<StateMap> {
    if text.is_empty() {
        return Err(HashLifeError::BadTextInput {
            reason: "input is empty".to_string(),
        });
    }
    let alive = single_char(alive_marker)?;
    let dead = single_char(dead_marker)?;

    let keep = regex::escape(&format!("{alive}{dead}"));
    let strip_re = Regex::new(&format!("[^{keep}]")).expect("a two-character escaped class is always a valid regex");
    let markers = strip_re.replace_all(text, "");

    let cells: Vec<Cell> = markers.chars().map(|c| Cell::from(c == alive)).collect();

    let side = (cells.len() as f64).sqrt().round() as usize;
    if side * side != cells.len() {
        return Err(HashLifeError::BadTextInput {
            reason: format!("{} marker characters is not a perfect square", cells.len()),
        });
    }
    if side < 2 || !side.is_power_of_two() {
        return Err(HashLifeError::BadTextInput {
            reason: format!("grid side {side} is not an even power of two >= 2"),
        });
    }
    let level = side.trailing_zeros() as usize;

    let rows: Vec<Vec<Cell>> = cells.into_iter().chunks(side).into_iter().map(|row| row.collect()).collect();
    StateMap::new(level, rows)
}

/// Render a `StateMap` as ASCII art: one marker per cell, rows separated by
/// a single space — the inverse of [`decode`].
pub fn encode(sm: &StateMap, alive_marker: &str, dead_marker: &str) -> Result<String> {
    let alive = single_char(alive_marker)?;
    let dead = single_char(dead_marker)?;
    Ok(sm
        .to_rows()
        .iter()
        .map(|row| row.iter().map(|cell| if cell.is_alive() { alive } else { dead }).collect::<String>())
        .join(" "))
}
