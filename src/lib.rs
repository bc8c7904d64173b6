//! Reeltext bakes styled text overlays into short vertical videos.
//!
//! An export turns an ordered list of editor text elements plus a source video into a new
//! MP4 in which every visible element is burned in.
//!
//! # Pipeline overview
//!
//! 1. **Rasterize**: `TextElement + FrameSize -> OverlayRaster` (one transparent frame-sized
//!    RGBA image per visible element, drawn on the CPU)
//! 2. **Stage**: the source video and one PNG per overlay are written into the engine's
//!    file store
//! 3. **Compose**: a chained `overlay` filter graph (or a stream copy when nothing is
//!    visible) runs inside the engine
//! 4. **Read back**: the output is returned as a [`VideoBlob`] and every staged file is
//!    removed again
//!
//! Constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic rasters**: the same element, frame and fonts always give the same pixels.
//! - **All-or-nothing exports**: a failed export returns no output and leaves the engine's
//!   store as it found it.
//! - **Premultiplied RGBA8** internally, straight alpha in encoded PNGs.
#![forbid(unsafe_code)]

mod engine;
mod export;
mod foundation;
mod model;
mod raster;
mod text;

pub use engine::{
    Engine, EngineEvent, FfmpegEngine, InMemoryEngine, MediaInfo, is_ffmpeg_on_path,
    shared_engine,
};
pub use export::blob::{MP4_MIME, VideoBlob};
pub use export::config::{ExportOpts, FramePolicy};
pub use export::graph::{FilterGraph, OUTPUT_LABEL};
pub use export::pipeline::{
    ExportPlan, Exporter, INPUT_NAME, OUTPUT_NAME, overlay_name, visible_elements,
};
pub use export::progress::{ProgressFn, ProgressReporter};
pub use export::source::VideoSource;
pub use foundation::core::{FrameSize, Rgba8Premul};
pub use foundation::error::{ExportStage, ReelError, ReelResult};
pub use model::color::{ColorDef, parse_css_color};
pub use model::element::{
    Animation, AnimationType, BackgroundStyle, GradientStyle, Position, ShadowStyle,
    StrokeStyle, TextAlign, TextElement,
};
pub use raster::layer::PixelBounds;
pub use raster::paint::LinearGradient;
pub use raster::rasterizer::{OverlayRaster, OverlayRasterizer};
pub use text::fonts::{FontBook, ResolvedFont};
pub use text::shaper::{LineStyle, PlacedGlyph, ShapedLine, TextShaper};
