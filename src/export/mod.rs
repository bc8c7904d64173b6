//! Composition pipeline: stage the source and overlays in the engine, run the overlay
//! graph, read the result back and clean up.

pub mod blob;
pub mod config;
pub mod graph;
pub mod pipeline;
pub mod progress;
pub mod source;
