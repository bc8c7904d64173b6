use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;

use crate::engine::{Engine, EngineEvent, FfmpegEngine, MediaInfo, shared_engine};
use crate::export::blob::VideoBlob;
use crate::export::config::ExportOpts;
use crate::export::graph::FilterGraph;
use crate::export::progress::{ProgressFn, ProgressReporter};
use crate::export::source::VideoSource;
use crate::foundation::core::FrameSize;
use crate::foundation::error::{ExportStage, ReelError, ReelResult};
use crate::model::element::TextElement;
use crate::raster::rasterizer::{OverlayRaster, OverlayRasterizer};
use crate::text::fonts::FontBook;

/// Engine store name of the staged source video.
pub const INPUT_NAME: &str = "input.mp4";
/// Engine store name of the composed video.
pub const OUTPUT_NAME: &str = "output.mp4";

/// Engine store name of the `index`-th overlay (z-order, bottom first).
pub fn overlay_name(index: usize) -> String {
    format!("overlay_{index}.png")
}

/// Elements that take part in an export, in z-order.
pub fn visible_elements(elements: &[TextElement]) -> Vec<&TextElement> {
    elements.iter().filter(|e| e.visible).collect()
}

/// Everything an export will stage and run, computed without touching an engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportPlan {
    pub frame: FrameSize,
    /// Ids of the overlaid elements, bottom first.
    pub element_ids: Vec<String>,
    /// Files staged before execution: the source video, then one image per overlay.
    pub staged: Vec<String>,
    /// Textual filter graph; `None` on the stream-copy fast path.
    pub graph: Option<String>,
    /// Engine command line.
    pub args: Vec<String>,
    pub output: String,
}

impl ExportPlan {
    pub fn new(frame: FrameSize, visible: &[&TextElement]) -> Self {
        let element_ids: Vec<String> = visible.iter().map(|e| e.id.clone()).collect();
        let overlays: Vec<String> = (0..visible.len()).map(overlay_name).collect();

        let mut staged = vec![INPUT_NAME.to_string()];
        staged.extend(overlays.iter().cloned());

        let mut args = vec!["-i".to_string(), INPUT_NAME.to_string()];
        let graph = if overlays.is_empty() {
            args.extend(["-c".to_string(), "copy".to_string()]);
            None
        } else {
            for name in &overlays {
                args.extend(["-i".to_string(), name.clone()]);
            }
            let graph = FilterGraph::new(overlays.len());
            args.extend([
                "-filter_complex".to_string(),
                graph.to_string(),
                "-map".to_string(),
                graph.output_map(),
                "-map".to_string(),
                "0:a?".to_string(),
                "-c:a".to_string(),
                "copy".to_string(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
            ]);
            Some(graph.to_string())
        };
        args.push(OUTPUT_NAME.to_string());

        Self {
            frame,
            element_ids,
            staged,
            graph,
            args,
            output: OUTPUT_NAME.to_string(),
        }
    }

    /// No visible overlays: the source is stream-copied.
    pub fn is_fast_path(&self) -> bool {
        self.graph.is_none()
    }

    pub fn overlay_names(&self) -> impl Iterator<Item = &str> {
        self.staged.iter().skip(1).map(String::as_str)
    }

    /// Shell-style rendering of the command line for display.
    pub fn command_line(&self, program: &str) -> String {
        let mut out = program.to_string();
        for arg in &self.args {
            out.push(' ');
            if arg.contains([' ', ';', '[', ']', '?']) {
                out.push('\'');
                out.push_str(arg);
                out.push('\'');
            } else {
                out.push_str(arg);
            }
        }
        out
    }
}

/// Holds the engine for the duration of one export and removes the files this export
/// created on drop, whichever way the export ends. Files already in the store when the
/// export started are never written or deleted.
struct Staging<'a, E: Engine> {
    engine: MutexGuard<'a, E>,
    existing: BTreeSet<String>,
    created: Vec<String>,
}

impl<'a, E: Engine> Staging<'a, E> {
    fn new(engine: MutexGuard<'a, E>) -> ReelResult<Self> {
        let existing = engine.list_files()?.into_iter().collect();
        Ok(Self {
            engine,
            existing,
            created: Vec::new(),
        })
    }

    fn stage(&mut self, name: &str, bytes: &[u8]) -> ReelResult<()> {
        self.claim(name)?;
        self.engine.write_file(name, bytes)?;
        tracing::debug!(name, bytes = bytes.len(), "staged engine file");
        Ok(())
    }

    /// Reserve `name` for this export. Claimed before writing so a partial write is still
    /// cleaned up.
    fn claim(&mut self, name: &str) -> ReelResult<()> {
        if self.existing.contains(name) || self.created.iter().any(|n| n == name) {
            return Err(ReelError::engine(format!(
                "engine file '{name}' already exists; refusing to overwrite it"
            )));
        }
        self.created.push(name.to_string());
        Ok(())
    }

    fn engine(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: Engine> Drop for Staging<'_, E> {
    fn drop(&mut self) {
        for name in std::mem::take(&mut self.created).into_iter().rev() {
            let Err(e) = self.engine.delete_file(&name) else {
                continue;
            };
            // Claimed names that were never written are expected to be missing.
            let absent = self
                .engine
                .list_files()
                .is_ok_and(|files| !files.contains(&name));
            if !absent {
                tracing::warn!(name = %name, error = %e, "failed to delete staged engine file");
            }
        }
    }
}

/// Composes text overlays onto a video with an exclusively held engine.
pub struct Exporter<E: Engine> {
    engine: Arc<Mutex<E>>,
    rasterizer: OverlayRasterizer,
    opts: ExportOpts,
    pool: Option<rayon::ThreadPool>,
}

impl Exporter<FfmpegEngine> {
    /// Exporter on the process-wide ffmpeg engine.
    pub fn shared(opts: ExportOpts) -> ReelResult<Self> {
        Self::new(shared_engine(), opts)
    }
}

impl<E: Engine> Exporter<E> {
    pub fn new(engine: Arc<Mutex<E>>, opts: ExportOpts) -> ReelResult<Self> {
        opts.validate()?;
        let fonts = if opts.font_dirs.is_empty() {
            FontBook::shared()
        } else {
            Arc::new(FontBook::load(&opts.font_dirs))
        };
        let pool = opts.threads.map(build_thread_pool).transpose()?;
        Ok(Self {
            engine,
            rasterizer: OverlayRasterizer::new(fonts),
            opts,
            pool,
        })
    }

    pub fn with_rasterizer(mut self, rasterizer: OverlayRasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn engine(&self) -> &Arc<Mutex<E>> {
        &self.engine
    }

    pub fn opts(&self) -> &ExportOpts {
        &self.opts
    }

    pub fn rasterizer(&self) -> &OverlayRasterizer {
        &self.rasterizer
    }

    /// Plan an export at the configured frame size.
    pub fn plan(&self, elements: &[TextElement]) -> ExportPlan {
        ExportPlan::new(self.opts.frame, &visible_elements(elements))
    }

    /// Rasterize every visible element in parallel, preserving z-order.
    pub fn rasterize_all(
        &self,
        elements: &[TextElement],
        frame: FrameSize,
    ) -> ReelResult<Vec<OverlayRaster>> {
        let visible = visible_elements(elements);
        self.in_pool(|| {
            visible
                .par_iter()
                .map(|e| self.rasterizer.rasterize(e, frame))
                .collect()
        })
    }

    /// Overlay `elements` onto `source` and return the composed video.
    ///
    /// All-or-nothing: on any error no output is returned, and in every case the engine's
    /// file store is left as it was found. A staged name that is already taken in the store
    /// fails the export at the stage that needs it. `on_progress` receives whole percents
    /// from a separate thread and may still be running when this returns.
    #[tracing::instrument(skip_all, fields(source = %source.describe(), elements = elements.len()))]
    pub fn export(
        &self,
        source: &VideoSource,
        elements: &[TextElement],
        on_progress: Option<ProgressFn>,
    ) -> ReelResult<VideoBlob> {
        let started = Instant::now();
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        engine
            .load()
            .map_err(|e| e.at_stage(ExportStage::EngineLoad))?;
        tracing::debug!(engine = engine.name(), "engine ready");

        let mut staging =
            Staging::new(engine).map_err(|e| e.at_stage(ExportStage::EngineLoad))?;
        let mut reporter = ProgressReporter::new(on_progress);

        source
            .fetch(Duration::from_secs(self.opts.fetch_timeout_secs))
            .and_then(|bytes| staging.stage(INPUT_NAME, &bytes))
            .map_err(|e| e.at_stage(ExportStage::Fetch))?;

        let visible = visible_elements(elements);
        let plan = if visible.is_empty() {
            tracing::info!("no visible overlays, stream-copying source");
            ExportPlan::new(self.opts.frame, &visible)
        } else {
            let frame = self
                .frame_for_source(staging.engine())
                .map_err(|e| e.at_stage(ExportStage::Rasterize))?;
            let plan = ExportPlan::new(frame, &visible);
            let pngs = self
                .encode_overlays(&visible, frame)
                .map_err(|e| e.at_stage(ExportStage::Rasterize))?;
            for (name, png) in plan.overlay_names().zip(&pngs) {
                staging
                    .stage(name, png)
                    .map_err(|e| e.at_stage(ExportStage::Rasterize))?;
            }
            plan
        };

        staging
            .claim(OUTPUT_NAME)
            .map_err(|e| e.at_stage(ExportStage::Execute))?;
        staging
            .engine()
            .exec(&plan.args, &mut |event| match event {
                EngineEvent::Progress(fraction) => reporter.report(fraction),
                EngineEvent::Log(line) => tracing::trace!(target: "reeltext::engine", "{line}"),
            })
            .map_err(|e| e.at_stage(ExportStage::Execute))?;

        let bytes = staging
            .engine()
            .read_file(OUTPUT_NAME)
            .map_err(|e| e.at_stage(ExportStage::Readback))?;
        drop(staging);

        reporter.report(1.0);
        reporter.finish();
        tracing::info!(
            overlays = visible.len(),
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "export finished"
        );
        Ok(VideoBlob::mp4(bytes))
    }

    fn frame_for_source(&self, engine: &mut E) -> ReelResult<FrameSize> {
        let info: Option<MediaInfo> = match engine.probe(INPUT_NAME) {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(error = %e, "could not probe source video");
                None
            }
        };
        self.opts.resolve_frame(info.as_ref())
    }

    fn encode_overlays(&self, visible: &[&TextElement], frame: FrameSize) -> ReelResult<Vec<Vec<u8>>> {
        self.in_pool(|| {
            visible
                .par_iter()
                .map(|e| {
                    let raster = self.rasterizer.rasterize(e, frame)?;
                    let png = raster.to_png()?;
                    tracing::debug!(
                        id = %e.id,
                        bytes = png.len(),
                        digest = %format_args!("{:016x}", raster.fingerprint()),
                        "overlay encoded"
                    );
                    Ok(png)
                })
                .collect()
        })
    }

    fn in_pool<T: Send>(&self, work: impl FnOnce() -> T + Send) -> T {
        match &self.pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }
}

fn build_thread_pool(threads: usize) -> ReelResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(ReelError::validation("rasterizer threads must be >= 1"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("reeltext-raster-{i}"))
        .build()
        .map_err(|e| ReelError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
