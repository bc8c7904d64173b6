//! Font lookup and single-line shaping.

pub mod fonts;
pub mod shaper;
