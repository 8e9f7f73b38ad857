//! Failure diagnostics: a screenshot and a DOM dump per failed stage.
//!
//! Capture is best effort. A failed capture is logged and reported as a
//! missing path; it never replaces the error that triggered it.

use crate::driver::BrowserDriver;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Paths of the files a capture managed to write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    /// PNG screenshot
    pub screenshot: Option<PathBuf>,
    /// Serialized DOM
    pub html: Option<PathBuf>,
}

impl Artifacts {
    /// Whether nothing was captured
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.screenshot.is_none() && self.html.is_none()
    }
}

/// Writes `<dir>/<name>_error.png` and `<dir>/<name>_error.html`
#[derive(Debug, Clone)]
pub struct ArtifactCapture {
    dir: PathBuf,
}

impl ArtifactCapture {
    /// Capture into `dir` (created on first use)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Screenshot and DOM dump of the driver's current page
    pub async fn capture<D: BrowserDriver + ?Sized>(&self, driver: &mut D, name: &str) -> Artifacts {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "cannot create artifact directory");
            return Artifacts::default();
        }

        let screenshot_path = self.dir.join(format!("{name}_error.png"));
        let screenshot = match driver.screenshot(&screenshot_path).await {
            Ok(()) => Some(screenshot_path),
            Err(e) => {
                warn!(name, error = %e, "screenshot capture failed");
                None
            }
        };

        let html_path = self.dir.join(format!("{name}_error.html"));
        let html = match driver.html_dump(&html_path).await {
            Ok(()) => Some(html_path),
            Err(e) => {
                warn!(name, error = %e, "DOM dump failed");
                None
            }
        };

        let artifacts = Artifacts { screenshot, html };
        info!(name, ?artifacts, "failure artifacts captured");
        artifacts
    }
}
