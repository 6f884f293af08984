//! Run orchestration: rule registration, the analysis pipeline, and the
//! formatting and filtering entry points.

pub mod engine;

pub use engine::Engine;
