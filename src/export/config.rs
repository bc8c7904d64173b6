use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::MediaInfo;
use crate::foundation::core::FrameSize;
use crate::foundation::error::{ReelError, ReelResult};

/// How the overlay frame size relates to the source video.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FramePolicy {
    /// Always rasterize at the configured frame; a different source size is logged.
    #[default]
    Fixed,
    /// Like `Fixed`, but a different source size fails the export.
    Strict,
    /// Rasterize at the probed source size (configured frame when probing is unavailable).
    MatchSource,
}

impl std::str::FromStr for FramePolicy {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fixed" => Ok(Self::Fixed),
            "strict" => Ok(Self::Strict),
            "match-source" => Ok(Self::MatchSource),
            other => Err(ReelError::validation(format!(
                "unknown frame policy '{other}' (expected fixed, strict or match-source)"
            ))),
        }
    }
}

/// Export configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOpts {
    pub frame: FrameSize,
    pub frame_policy: FramePolicy,
    /// Rasterizer threads; `None` uses rayon's global pool.
    pub threads: Option<usize>,
    /// Extra font directories scanned in addition to system fonts.
    pub font_dirs: Vec<PathBuf>,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// Timeout for fetching remote sources.
    pub fetch_timeout_secs: u64,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            frame: FrameSize::PORTRAIT_1080,
            frame_policy: FramePolicy::Fixed,
            threads: None,
            font_dirs: Vec::new(),
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            fetch_timeout_secs: 120,
        }
    }
}

impl ExportOpts {
    /// Defaults overlaid with `REELTEXT_*` environment variables.
    pub fn from_env() -> ReelResult<Self> {
        let mut opts = Self::default();
        opts.apply_env(|key| std::env::var(key).ok())?;
        Ok(opts)
    }

    /// Overlay settings from a variable lookup.
    ///
    /// Recognized: `REELTEXT_FFMPEG`, `REELTEXT_FFPROBE`, `REELTEXT_THREADS`,
    /// `REELTEXT_FONT_DIRS` (path list), `REELTEXT_FRAME` (`WxH`).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ReelResult<()> {
        if let Some(v) = lookup("REELTEXT_FFMPEG").filter(|v| !v.is_empty()) {
            self.ffmpeg = PathBuf::from(v);
        }
        if let Some(v) = lookup("REELTEXT_FFPROBE").filter(|v| !v.is_empty()) {
            self.ffprobe = PathBuf::from(v);
        }
        if let Some(v) = lookup("REELTEXT_THREADS").filter(|v| !v.is_empty()) {
            let n: usize = v.trim().parse().map_err(|_| {
                ReelError::validation(format!("REELTEXT_THREADS must be a number, got '{v}'"))
            })?;
            self.threads = (n > 0).then_some(n);
        }
        if let Some(v) = lookup("REELTEXT_FONT_DIRS").filter(|v| !v.is_empty()) {
            self.font_dirs
                .extend(std::env::split_paths(&v).filter(|p| !p.as_os_str().is_empty()));
        }
        if let Some(v) = lookup("REELTEXT_FRAME").filter(|v| !v.is_empty()) {
            self.frame = v.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ReelResult<()> {
        FrameSize::new(self.frame.width, self.frame.height)?;
        if self.threads == Some(0) {
            return Err(ReelError::validation("threads must be > 0"));
        }
        Ok(())
    }

    /// Frame to rasterize at, given what the engine could tell about the source.
    pub fn resolve_frame(&self, source: Option<&MediaInfo>) -> ReelResult<FrameSize> {
        let Some(info) = source else {
            if self.frame_policy != FramePolicy::Fixed {
                tracing::debug!(
                    policy = ?self.frame_policy,
                    "source size unknown, using configured frame"
                );
            }
            return Ok(self.frame);
        };
        let source_frame = FrameSize::new(info.width, info.height)?;
        if source_frame == self.frame {
            return Ok(self.frame);
        }

        match self.frame_policy {
            FramePolicy::Fixed => {
                tracing::warn!(
                    frame = %self.frame,
                    source = %source_frame,
                    "source video size differs from overlay frame"
                );
                Ok(self.frame)
            }
            FramePolicy::Strict => Err(ReelError::validation(format!(
                "source video is {source_frame}, overlays are {}",
                self.frame
            ))),
            FramePolicy::MatchSource => Ok(source_frame),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/config.rs"]
mod tests;
