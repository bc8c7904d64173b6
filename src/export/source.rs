use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::foundation::error::{ReelError, ReelResult};

/// Where the source video comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoSource {
    /// Local file.
    Path(PathBuf),
    /// `http://` or `https://` URL.
    Url(String),
    /// Bytes already in memory.
    Bytes(Vec<u8>),
}

impl VideoSource {
    /// Interpret a CLI/editor reference: URL, `file://` URL or plain path.
    pub fn parse(reference: &str) -> Self {
        let reference = reference.trim();
        if let Some(path) = reference.strip_prefix("file://") {
            return Self::Path(PathBuf::from(path));
        }
        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Self::Url(reference.to_string());
        }
        Self::Path(PathBuf::from(reference))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Url(u) => u.clone(),
            Self::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }

    /// Read the whole video into memory.
    #[tracing::instrument(skip(self), fields(source = %self.describe()))]
    pub fn fetch(&self, timeout: Duration) -> ReelResult<Vec<u8>> {
        let bytes = match self {
            Self::Path(p) => read_local(p)?,
            Self::Url(url) => fetch_url(url, timeout)?,
            Self::Bytes(b) => b.clone(),
        };
        if bytes.is_empty() {
            return Err(ReelError::fetch(format!(
                "source video '{}' is empty",
                self.describe()
            )));
        }
        tracing::debug!(bytes = bytes.len(), "source video fetched");
        Ok(bytes)
    }
}

impl From<PathBuf> for VideoSource {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

impl From<&Path> for VideoSource {
    fn from(p: &Path) -> Self {
        Self::Path(p.to_path_buf())
    }
}

fn read_local(path: &Path) -> ReelResult<Vec<u8>> {
    std::fs::read(path)
        .with_context(|| format!("read source video '{}'", path.display()))
        .map_err(|e| ReelError::fetch(format!("{e:#}")))
}

#[cfg(feature = "http")]
fn fetch_url(url: &str, timeout: Duration) -> ReelResult<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ReelError::fetch(format!("build http client: {e}")))?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| ReelError::fetch(format!("GET {url}: {e}")))?;
    let bytes = response
        .bytes()
        .map_err(|e| ReelError::fetch(format!("read body of {url}: {e}")))?;
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "http"))]
fn fetch_url(url: &str, _timeout: Duration) -> ReelResult<Vec<u8>> {
    Err(ReelError::fetch(format!(
        "cannot fetch '{url}': built without the 'http' feature"
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/export/source.rs"]
mod tests;
