use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::ReelResult;

pub const MP4_MIME: &str = "video/mp4";

/// Exported video bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoBlob {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

impl std::fmt::Debug for VideoBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoBlob")
            .field("bytes", &self.bytes.len())
            .field("mime", &self.mime)
            .finish()
    }
}

impl VideoBlob {
    pub fn mp4(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: MP4_MIME,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Download name for an export finished at `at`.
    pub fn file_name_at<Tz: chrono::TimeZone>(at: &chrono::DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!("text-overlay-{}.mp4", at.format("%Y%m%d-%H%M%S"))
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ReelResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("write video '{}'", path.display()))?;
        Ok(())
    }

    /// Write into `dir` under a timestamped name and return the full path.
    pub fn save_to_dir(&self, dir: &Path) -> ReelResult<PathBuf> {
        let path = dir.join(Self::file_name_at(&chrono::Local::now()));
        self.save_to(&path)?;
        tracing::info!(path = %path.display(), bytes = self.len(), "video saved");
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/blob.rs"]
mod tests;
