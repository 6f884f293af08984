//! Command implementations for the pagecheck CLI.
//!
//! `analyze` runs the full pipeline over a captured page: load, freeze,
//! filter rules by capability, score, and render. `rules` inspects the
//! built-in rule roster without running anything.

pub mod analyze;
pub mod rules;
