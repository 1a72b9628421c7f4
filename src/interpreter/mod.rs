//! Command interpreter: classifies a recognized transcript into an intent
//!
//! Matching is deliberately simple: ordered, first-match-wins,
//! case-insensitive substring tests, with the argument recovered by
//! stripping the trigger text once and trimming.

mod intent;
mod parser;

pub use intent::{Intent, InterpretError, KnownApp};
pub use parser::interpret;
