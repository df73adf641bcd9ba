//! Declarative YAML suite settings
//!
//! Every field is optional; whatever is present overrides the built-in
//! defaults of [`RunnerConfig`]. Command-line flags are applied on top by the
//! harness.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};
use crate::fixtures::CandidatePool;
use crate::playwright::Browser;
use crate::runner::RunnerConfig;
use crate::scenarios::TitleCheck;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuiteSettings {
    /// Root URL of the application under test
    pub base_url: Option<String>,

    /// Program and arguments that start the application
    pub server_command: Option<Vec<String>>,
    pub server_dir: Option<PathBuf>,
    pub health_path: Option<String>,
    pub startup_timeout_secs: Option<u64>,

    pub browser: Option<Browser>,
    pub headless: Option<bool>,
    pub slow_mo_ms: Option<u64>,
    pub viewport: Option<Viewport>,
    pub default_timeout_ms: Option<u64>,
    pub node_modules: Option<PathBuf>,

    pub report_path: Option<PathBuf>,
    pub screenshot_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,

    /// Directory of candidate YAML pools replacing the built-in pool
    pub fixtures_dir: Option<PathBuf>,

    pub seed: Option<u64>,
    pub title_check: Option<TitleCheck>,
    pub exclude_tags: Option<Vec<String>>,
}

impl SuiteSettings {
    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse settings from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Overlay the fields that are set onto `config`
    pub fn apply(self, config: &mut RunnerConfig) -> E2eResult<()> {
        if let Some(url) = self.base_url {
            config.server.base_url = url;
        }
        if let Some(command) = self.server_command {
            if command.is_empty() {
                return Err(E2eError::InvalidConfig("server_command is empty".to_string()));
            }
            config.server.command = Some(command);
        }
        if let Some(dir) = self.server_dir {
            config.server.working_dir = Some(dir);
        }
        if let Some(path) = self.health_path {
            config.server.health_path = path;
        }
        if let Some(secs) = self.startup_timeout_secs {
            config.server.startup_timeout = Duration::from_secs(secs);
        }

        let pw = &mut config.playwright;
        if let Some(browser) = self.browser {
            pw.browser = browser;
        }
        if let Some(headless) = self.headless {
            pw.headless = headless;
        }
        if let Some(ms) = self.slow_mo_ms {
            pw.slow_mo_ms = ms;
        }
        if let Some(viewport) = self.viewport {
            pw.viewport_width = viewport.width;
            pw.viewport_height = viewport.height;
        }
        if let Some(ms) = self.default_timeout_ms {
            pw.default_timeout_ms = ms;
            // Keep the bridge guard above Playwright's own timeout
            let floor = Duration::from_millis(ms) + Duration::from_secs(15);
            if pw.call_timeout < floor {
                pw.call_timeout = floor;
            }
        }
        if let Some(dir) = self.node_modules {
            pw.node_modules = dir;
        }

        if let Some(path) = self.report_path {
            config.report_path = path;
        }
        if let Some(dir) = self.screenshot_dir {
            config.screenshot_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(dir) = self.fixtures_dir {
            config.candidates = CandidatePool::load_dir(&dir)?;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(check) = self.title_check {
            config.title_check = check;
        }
        if let Some(tags) = self.exclude_tags {
            config.exclude_tags = tags;
        }
        Ok(())
    }
}
