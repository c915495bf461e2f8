//! Crossword grid filler.
//!
//! Parses a grid structure into slots and a crossing map, then fills the
//! slots from a word list with a CSP solver: node and arc consistency
//! (AC-3) up front, backtracking search with MRV/degree slot selection,
//! least-constraining-value ordering, and arc-consistency inference at
//! each assignment.

pub mod grid;
pub mod render;
pub mod solver;
pub mod words;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given slot, based on its index in the Grid's `slots` field.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the Wordlist's `words` field.
pub type WordId = usize;

pub use grid::{Direction, Grid, GridError, Slot};
pub use render::render;
pub use solver::{Solution, SolveStats, Solver};
pub use words::{Word, Wordlist, WordlistError};
