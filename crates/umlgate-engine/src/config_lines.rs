//! Process-wide config lines handed to every render.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Config lines read from an optional file on first use.
///
/// A successful read is kept for the lifetime of the value. A failed read
/// is not cached: the request that hit it fails and the next one retries.
/// Concurrent first requests may each read the file, but only one result
/// is ever stored.
#[derive(Debug, Default)]
pub struct ConfigLines {
    path: Option<PathBuf>,
    lines: OnceLock<Vec<String>>,
}

impl ConfigLines {
    /// Config lines backed by `path` (`None` means no config lines).
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            lines: OnceLock::new(),
        }
    }

    /// Config file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The config lines, reading the file on first call.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file is declared but cannot be read.
    pub fn get(&self) -> std::io::Result<&[String]> {
        if let Some(lines) = self.lines.get() {
            return Ok(lines);
        }
        let lines = match &self.path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                tracing::info!(path = %path.display(), "Loaded render config lines");
                content.lines().map(str::to_owned).collect()
            }
            None => Vec::new(),
        };
        Ok(self.lines.get_or_init(|| lines))
    }
}
