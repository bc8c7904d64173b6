//! Editor-facing input records.

/// CSS color parsing.
pub mod color;
/// Text element schema.
pub mod element;
