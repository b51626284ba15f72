//! Server configuration assembled from command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wall-clock limit for `lmms -r`.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Relative project paths are resolved against this directory.
    pub project_dir: PathBuf,
    /// Explicit LMMS binary; falls back to `LMMS_BIN` and then `PATH`.
    pub lmms_bin: Option<PathBuf>,
    pub render_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            lmms_bin: None,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_lmms_bin(mut self, bin: Option<PathBuf>) -> Self {
        self.lmms_bin = bin;
        self
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Resolve a tool-supplied path against the project directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }
}
