//! Renderers that turn a formatted result tree into concrete output.

pub mod text;

pub use text::TextRenderer;
