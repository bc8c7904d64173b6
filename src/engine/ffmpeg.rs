use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;

use anyhow::Context;

use crate::engine::{Engine, EngineEvent, MediaInfo, check_file_name};
use crate::foundation::error::{ReelError, ReelResult};

/// Log lines kept for error reports.
const LOG_TAIL_LINES: usize = 20;

pub fn is_ffmpeg_on_path() -> bool {
    binary_version(Path::new("ffmpeg")).is_ok()
}

/// System ffmpeg confined to a private temporary directory.
///
/// `load` verifies the binary and creates the sandbox; the sandbox (and anything left in
/// it) is removed when the engine is dropped.
#[derive(Debug)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    sandbox: Option<tempfile::TempDir>,
    version: Option<String>,
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FfmpegEngine {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            sandbox: None,
            version: None,
        }
    }

    /// Binaries from `REELTEXT_FFMPEG` / `REELTEXT_FFPROBE`, falling back to `PATH`.
    pub fn from_env() -> Self {
        let ffmpeg = std::env::var_os("REELTEXT_FFMPEG").unwrap_or_else(|| "ffmpeg".into());
        let ffprobe = std::env::var_os("REELTEXT_FFPROBE").unwrap_or_else(|| "ffprobe".into());
        Self::new(ffmpeg, ffprobe)
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    /// Sandbox directory, once loaded.
    pub fn sandbox_dir(&self) -> Option<&Path> {
        self.sandbox.as_ref().map(|d| d.path())
    }

    /// First line of `ffmpeg -version`, once loaded.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn dir(&self) -> ReelResult<&Path> {
        self.sandbox_dir()
            .ok_or_else(|| ReelError::engine("ffmpeg engine is not loaded"))
    }

    fn file_path(&self, name: &str) -> ReelResult<PathBuf> {
        check_file_name(name)?;
        Ok(self.dir()?.join(name))
    }
}

impl Engine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    #[tracing::instrument(skip(self), fields(ffmpeg = %self.ffmpeg.display()))]
    fn load(&mut self) -> ReelResult<()> {
        if self.sandbox.is_some() {
            return Ok(());
        }

        let version = binary_version(&self.ffmpeg)?;
        let sandbox = tempfile::Builder::new()
            .prefix("reeltext-engine-")
            .tempdir()
            .context("create ffmpeg sandbox directory")?;
        tracing::info!(
            version = %version,
            sandbox = %sandbox.path().display(),
            "ffmpeg engine loaded"
        );
        self.version = Some(version);
        self.sandbox = Some(sandbox);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.sandbox.is_some()
    }

    fn write_file(&mut self, name: &str, bytes: &[u8]) -> ReelResult<()> {
        let path = self.file_path(name)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("write engine file '{name}'"))?;
        Ok(())
    }

    fn read_file(&mut self, name: &str) -> ReelResult<Vec<u8>> {
        let path = self.file_path(name)?;
        std::fs::read(&path).map_err(|e| ReelError::engine(format!("read '{name}': {e}")))
    }

    fn delete_file(&mut self, name: &str) -> ReelResult<()> {
        let path = self.file_path(name)?;
        std::fs::remove_file(&path).map_err(|e| ReelError::engine(format!("delete '{name}': {e}")))
    }

    fn list_files(&self) -> ReelResult<Vec<String>> {
        let dir = self.dir()?;
        let mut names = Vec::new();
        let entries = std::fs::read_dir(dir).context("list ffmpeg sandbox")?;
        for entry in entries {
            let entry = entry.context("read ffmpeg sandbox entry")?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    #[tracing::instrument(skip_all, fields(args = args.len()))]
    fn exec(&mut self, args: &[String], on_event: &mut dyn FnMut(EngineEvent)) -> ReelResult<()> {
        let dir = self.dir()?.to_path_buf();
        tracing::debug!(args = ?args, "running ffmpeg");

        let mut child = Command::new(&self.ffmpeg)
            .current_dir(&dir)
            .args(["-hide_banner", "-nostdin", "-y", "-progress", "pipe:1", "-nostats"])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReelError::engine(format!(
                    "failed to spawn '{}': {e}",
                    self.ffmpeg.display()
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::engine("failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::engine("failed to capture ffmpeg stderr"))?;

        // Both pipes drain concurrently so ffmpeg never blocks on a full pipe; events are
        // funnelled back to this thread because the callback is not `Send`.
        let (tx, rx) = mpsc::channel::<Output>();
        let progress_tx = tx.clone();
        let stdout_task = std::thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if progress_tx.send(Output::Progress(line)).is_err() {
                    break;
                }
            }
        });
        let stderr_task = std::thread::spawn(move || {
            for line in BufReader::new(stderr).lines() {
                let Ok(line) = line else { break };
                if tx.send(Output::Log(line)).is_err() {
                    break;
                }
            }
        });

        let mut state = ProgressState::default();
        let mut tail: VecDeque<String> = VecDeque::with_capacity(LOG_TAIL_LINES);
        for output in rx {
            match output {
                Output::Log(line) => {
                    if state.duration_secs.is_none() {
                        state.duration_secs = parse_duration_line(&line);
                    }
                    if tail.len() == LOG_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line.clone());
                    on_event(EngineEvent::Log(line));
                }
                Output::Progress(line) => {
                    let Some((key, value)) = line.trim().split_once('=') else {
                        continue;
                    };
                    state.update(key, value);
                    if key == "progress"
                        && let Some(fraction) = state.fraction()
                    {
                        on_event(EngineEvent::Progress(fraction));
                    }
                }
            }
        }

        let status = child.wait().context("wait for ffmpeg")?;
        if stdout_task.join().is_err() || stderr_task.join().is_err() {
            tracing::warn!("ffmpeg pipe reader panicked");
        }

        if !status.success() {
            let tail: Vec<String> = tail.into_iter().collect();
            return Err(ReelError::engine(format!(
                "ffmpeg exited with status {status}: {}",
                tail.join("\n").trim()
            )));
        }
        Ok(())
    }

    fn probe(&mut self, name: &str) -> ReelResult<Option<MediaInfo>> {
        let path = self.file_path(name)?;
        probe_media(&self.ffprobe, &path)
    }
}

enum Output {
    Progress(String),
    Log(String),
}

/// Accumulates `-progress` key/value blocks.
#[derive(Debug, Default)]
pub(crate) struct ProgressState {
    pub(crate) out_time_secs: f64,
    pub(crate) duration_secs: Option<f64>,
    pub(crate) complete: bool,
}

impl ProgressState {
    pub(crate) fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports microseconds under both keys.
            "out_time_us" | "out_time_ms" => {
                if let Ok(us) = value.trim().parse::<f64>() {
                    self.out_time_secs = (us / 1_000_000.0).max(0.0);
                }
            }
            "progress" => {
                self.complete = value.trim() == "end";
            }
            _ => {}
        }
    }

    /// Completed fraction, when it can be known.
    pub(crate) fn fraction(&self) -> Option<f64> {
        if self.complete {
            return Some(1.0);
        }
        let duration = self.duration_secs.filter(|d| *d > 0.0)?;
        Some((self.out_time_secs / duration).clamp(0.0, 1.0))
    }
}

/// Parse `  Duration: 00:00:12.34, start: ...` from the ffmpeg log.
pub(crate) fn parse_duration_line(line: &str) -> Option<f64> {
    let rest = line.trim_start().strip_prefix("Duration:")?;
    let stamp = rest.split(',').next()?.trim();
    let mut parts = stamp.split(':');
    let h: f64 = parts.next()?.parse().ok()?;
    let m: f64 = parts.next()?.parse().ok()?;
    let s: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(h * 3600.0 + m * 60.0 + s)
}

fn binary_version(binary: &Path) -> ReelResult<String> {
    let out = Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            ReelError::engine(format!(
                "ffmpeg binary '{}' is not available: {e}",
                binary.display()
            ))
        })?;
    if !out.status.success() {
        return Err(ReelError::engine(format!(
            "'{} -version' failed with status {}",
            binary.display(),
            out.status
        )));
    }
    Ok(String::from_utf8_lossy(&out.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string())
}

fn probe_media(ffprobe: &Path, path: &Path) -> ReelResult<Option<MediaInfo>> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = match Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
    {
        Ok(out) => out,
        Err(e) => {
            tracing::debug!(ffprobe = %ffprobe.display(), error = %e, "ffprobe unavailable");
            return Ok(None);
        }
    };
    if !out.status.success() {
        return Err(ReelError::engine(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::engine(format!("ffprobe json parse failed: {e}")))?;
    let Some(video) = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
    else {
        return Err(ReelError::engine(format!(
            "no video stream in '{}'",
            path.display()
        )));
    };
    let (Some(width), Some(height)) = (video.width, video.height) else {
        return Err(ReelError::engine("ffprobe reported no video dimensions"));
    };

    Ok(Some(MediaInfo {
        width,
        height,
        duration_sec: parsed
            .format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(|s| s.parse::<f64>().ok()),
        has_audio: parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio")),
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/engine/ffmpeg.rs"]
mod tests;
