//! Overlay rasterization: one text element to one transparent frame-sized image.

mod blur;
pub mod layer;
pub mod paint;
pub mod rasterizer;
pub mod surface;
