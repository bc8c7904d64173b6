//! Embedded video engine seam.
//!
//! An engine owns a private flat file store and runs ffmpeg-style command lines against
//! it. [`FfmpegEngine`] drives the system ffmpeg inside a sandbox directory;
//! [`InMemoryEngine`] scripts the same contract for tests and dry runs.

use std::sync::{Arc, Mutex, OnceLock};

use crate::foundation::error::{ReelError, ReelResult};

mod ffmpeg;
mod memory;

pub use ffmpeg::{FfmpegEngine, is_ffmpeg_on_path};
pub use memory::InMemoryEngine;

/// Event emitted while an engine command runs.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// Completed fraction of the current command, `0.0..=1.0`.
    Progress(f64),
    /// One line of engine log output.
    Log(String),
}

/// Basic stream facts about a staged media file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    pub duration_sec: Option<f64>,
    pub has_audio: bool,
}

/// Single-instance video engine with a private file store.
///
/// File names are flat (no separators, no `..`). Implementations are driven by one
/// export at a time; callers serialize access through a `Mutex`.
pub trait Engine: Send {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Prepare the engine. Idempotent: a loaded engine returns immediately.
    fn load(&mut self) -> ReelResult<()>;

    fn is_loaded(&self) -> bool;

    fn write_file(&mut self, name: &str, bytes: &[u8]) -> ReelResult<()>;

    fn read_file(&mut self, name: &str) -> ReelResult<Vec<u8>>;

    fn delete_file(&mut self, name: &str) -> ReelResult<()>;

    /// Names currently in the store, sorted.
    fn list_files(&self) -> ReelResult<Vec<String>>;

    /// Run one command line (without the program name) against the store.
    fn exec(&mut self, args: &[String], on_event: &mut dyn FnMut(EngineEvent)) -> ReelResult<()>;

    /// Inspect a staged file. Engines without probing support return `Ok(None)`.
    fn probe(&mut self, _name: &str) -> ReelResult<Option<MediaInfo>> {
        Ok(None)
    }
}

/// Reject names that would escape a flat file store.
pub(crate) fn check_file_name(name: &str) -> ReelResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
    {
        return Err(ReelError::engine(format!(
            "invalid engine file name '{name}'"
        )));
    }
    Ok(())
}

/// The process-wide ffmpeg engine, configured from the environment on first use.
///
/// Every export that goes through this handle is serialized on its mutex.
pub fn shared_engine() -> Arc<Mutex<FfmpegEngine>> {
    static ENGINE: OnceLock<Arc<Mutex<FfmpegEngine>>> = OnceLock::new();
    ENGINE
        .get_or_init(|| Arc::new(Mutex::new(FfmpegEngine::from_env())))
        .clone()
}

#[cfg(test)]
#[path = "../../tests/unit/engine/mod.rs"]
mod tests;
