//! Text report and screenshot capture

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::E2eResult;
use crate::playwright::PlaywrightHandle;

/// Append-only text log, one timestamped line per message
#[derive(Debug)]
pub struct TestReport {
    path: PathBuf,
}

impl TestReport {
    /// Open the report at `path`, truncating whatever a previous run left
    pub fn create(path: impl Into<PathBuf>) -> E2eResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, "")?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, message: impl AsRef<str>) -> E2eResult<()> {
        let message = message.as_ref();
        info!("[REPORT] {}", message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format_line(Utc::now(), message).as_bytes())?;
        Ok(())
    }
}

/// `[2025-01-31T10:00:00.000Z] message\n`
pub fn format_line(timestamp: DateTime<Utc>, message: &str) -> String {
    format!(
        "[{}] {}\n",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        message
    )
}

/// A captured screenshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotArtifact {
    pub name: String,
    pub path: PathBuf,

    /// SHA-256 of the PNG file
    pub sha256: Option<String>,

    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ScreenshotArtifact {
    /// Hash and measure the file at `path`.
    ///
    /// A file that cannot be read is still recorded, without metadata.
    pub fn inspect(name: &str, path: &Path) -> Self {
        let mut artifact = Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            sha256: None,
            width: None,
            height: None,
        };

        match hash_file(path) {
            Ok(hash) => artifact.sha256 = Some(hash),
            Err(e) => {
                warn!("Cannot hash screenshot {}: {}", path.display(), e);
                return artifact;
            }
        }

        match image::image_dimensions(path) {
            Ok((width, height)) => {
                artifact.width = Some(width);
                artifact.height = Some(height);
            }
            Err(e) => warn!("Cannot read screenshot dimensions {}: {}", path.display(), e),
        }

        artifact
    }
}

fn hash_file(path: &Path) -> E2eResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// `<name>-<unix millis>.png`
pub fn screenshot_file_name(name: &str, unix_millis: i64) -> String {
    format!("{}-{}.png", name, unix_millis)
}

/// Full-page screenshots collected for the running scenario
#[derive(Debug)]
pub struct ScreenshotStore {
    dir: PathBuf,
    artifacts: Vec<ScreenshotArtifact>,
}

impl ScreenshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> E2eResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            artifacts: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn capture(&mut self, page: &PlaywrightHandle, name: &str) -> E2eResult<PathBuf> {
        // The directory may have been cleaned between scenarios
        std::fs::create_dir_all(&self.dir)?;

        let path = self
            .dir
            .join(screenshot_file_name(name, Utc::now().timestamp_millis()));
        page.screenshot(&path, true).await?;

        self.artifacts.push(ScreenshotArtifact::inspect(name, &path));
        Ok(path)
    }

    /// Hand over everything captured since the last call
    pub fn take_artifacts(&mut self) -> Vec<ScreenshotArtifact> {
        std::mem::take(&mut self.artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            format_line(ts, "Finalización del test"),
            "[2025-03-04T05:06:07.000Z] Finalización del test\n"
        );
    }

    #[test]
    fn test_report_truncates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/test-report.txt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale line\n").unwrap();

        let report = TestReport::create(&path).unwrap();
        report.write("first").unwrap();
        report.write("second").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('[') && lines[0].ends_with("] first"));
        assert!(lines[1].ends_with("] second"));
    }

    #[test]
    fn test_screenshot_file_name() {
        assert_eq!(
            screenshot_file_name("01-dashboard", 1_700_000_000_000),
            "01-dashboard-1700000000000.png"
        );
    }

    #[test]
    fn test_inspect_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        image::RgbaImage::new(4, 3).save(&path).unwrap();

        let artifact = ScreenshotArtifact::inspect("shot", &path);
        assert_eq!(artifact.width, Some(4));
        assert_eq!(artifact.height, Some(3));
        assert_eq!(artifact.sha256.as_ref().map(|h| h.len()), Some(64));
    }

    #[test]
    fn test_inspect_missing_file() {
        let artifact = ScreenshotArtifact::inspect("gone", Path::new("/nonexistent/shot.png"));
        assert!(artifact.sha256.is_none());
        assert!(artifact.width.is_none());
    }

    #[test]
    fn test_store_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("test-results/screenshots");
        let store = ScreenshotStore::new(&shots).unwrap();
        assert!(store.dir().is_dir());
    }
}
