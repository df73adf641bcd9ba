//! Main test runner that orchestrates the application, the browser and reporting

use std::path::PathBuf;
use std::time::Instant;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::fixtures::CandidatePool;
use crate::playwright::{PlaywrightConfig, PlaywrightHandle};
use crate::report::{ScreenshotArtifact, ScreenshotStore, TestReport};
use crate::scenarios::{
    self, Outcome, Scenario, ScenarioContext, ScenarioFilter, ScenarioSettings, TitleCheck,
};
use crate::server::{ServerConfig, ServerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub status: ScenarioStatus,
    pub duration_ms: u64,

    /// Why the scenario failed or was skipped
    pub reason: Option<String>,

    /// RNG seed the scenario ran with
    pub seed: u64,

    pub screenshots: Vec<ScreenshotArtifact>,
}

impl ScenarioResult {
    pub fn success(&self) -> bool {
        self.status != ScenarioStatus::Failed
    }
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub seed: u64,
    pub report_path: PathBuf,
    pub results: Vec<ScenarioResult>,
}

impl TestSuiteResult {
    fn from_results(results: Vec<ScenarioResult>, duration_ms: u64, seed: u64, report_path: PathBuf) -> Self {
        let count = |status: ScenarioStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            total: results.len(),
            passed: count(ScenarioStatus::Passed),
            failed: count(ScenarioStatus::Failed),
            skipped: count(ScenarioStatus::Skipped),
            duration_ms,
            seed,
            report_path,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Main E2E test runner
pub struct TestRunner {
    config: RunnerConfig,

    /// Running application handle (if any)
    server: Option<ServerHandle>,

    scenarios: Vec<Box<dyn Scenario>>,
}

impl TestRunner {
    /// Create a new test runner with default configuration
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a test runner with custom configuration and the built-in scenarios
    pub fn with_config(config: RunnerConfig) -> Self {
        Self::with_scenarios(config, scenarios::all())
    }

    pub fn with_scenarios(config: RunnerConfig, scenarios: Vec<Box<dyn Scenario>>) -> Self {
        Self {
            config,
            server: None,
            scenarios,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Make sure the application answers, starting it if configured to
    pub async fn start_server(&mut self) -> E2eResult<()> {
        if self.server.is_some() {
            return Ok(()); // Already running
        }

        let server = ServerHandle::start(self.config.server.clone()).await?;
        self.config.server.base_url = server.base_url().to_string();
        self.server = Some(server);
        Ok(())
    }

    pub fn stop_server(&mut self) -> E2eResult<()> {
        if let Some(mut server) = self.server.take() {
            server.stop()?;
        }
        Ok(())
    }

    /// Run every scenario not excluded by tag
    pub async fn run_all(&mut self) -> E2eResult<TestSuiteResult> {
        let filter = ScenarioFilter {
            exclude_tags: self.config.exclude_tags.clone(),
            ..Default::default()
        };
        self.run_filtered(&filter).await
    }

    /// Run scenarios carrying a tag
    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<TestSuiteResult> {
        let filter = ScenarioFilter {
            tag: Some(tag.to_string()),
            ..Default::default()
        };
        self.run_filtered(&filter).await
    }

    /// Run a specific scenario by name
    pub async fn run_test(&mut self, name: &str) -> E2eResult<TestSuiteResult> {
        if !self.scenarios.iter().any(|s| s.name() == name) {
            return Err(E2eError::ScenarioNotFound(name.to_string()));
        }
        let filter = ScenarioFilter {
            name: Some(name.to_string()),
            ..Default::default()
        };
        self.run_filtered(&filter).await
    }

    pub async fn run_filtered(&mut self, filter: &ScenarioFilter) -> E2eResult<TestSuiteResult> {
        self.start_server().await?;

        let start = Instant::now();
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let report = TestReport::create(&self.config.report_path)?;
        let mut screenshots = ScreenshotStore::new(&self.config.screenshot_dir)?;

        let selected: Vec<&dyn Scenario> = self
            .scenarios
            .iter()
            .map(|s| &**s)
            .filter(|s| filter.matches(*s))
            .collect();

        info!("Running {} scenario(s) with seed {}...", selected.len(), seed);
        report.write(format!("Run started with seed {}", seed))?;

        let mut results = Vec::new();
        for (i, scenario) in selected.into_iter().enumerate() {
            let scenario_seed = seed.wrapping_add(i as u64);
            let result = self
                .run_scenario(scenario, &report, &mut screenshots, scenario_seed)
                .await;

            match result.status {
                ScenarioStatus::Passed => info!("✓ {} ({} ms)", result.name, result.duration_ms),
                ScenarioStatus::Skipped => warn!(
                    "- {} skipped: {}",
                    result.name,
                    result.reason.as_deref().unwrap_or("no reason given")
                ),
                ScenarioStatus::Failed => error!(
                    "✗ {} - {}",
                    result.name,
                    result.reason.as_deref().unwrap_or("unknown error")
                ),
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let suite = TestSuiteResult::from_results(results, duration_ms, seed, report.path().to_path_buf());

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            suite.passed, suite.failed, suite.skipped, suite.duration_ms
        );

        Ok(suite)
    }

    /// Run one scenario on a fresh browser page
    async fn run_scenario(
        &self,
        scenario: &dyn Scenario,
        report: &TestReport,
        screenshots: &mut ScreenshotStore,
        seed: u64,
    ) -> ScenarioResult {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name());

        let outcome = match PlaywrightHandle::launch(&self.config.playwright).await {
            Ok(page) => {
                self.run_on_session(scenario, page, report, screenshots, seed)
                    .await
            }
            Err(e) => Err(e),
        };

        let (status, reason) = match outcome {
            Ok(Outcome::Passed) => (ScenarioStatus::Passed, None),
            Ok(Outcome::Failed(reason)) => (ScenarioStatus::Failed, Some(reason)),
            Ok(Outcome::Skipped(reason)) => (ScenarioStatus::Skipped, Some(reason)),
            Err(e) => (ScenarioStatus::Failed, Some(e.to_string())),
        };

        ScenarioResult {
            name: scenario.name().to_string(),
            status,
            duration_ms: start.elapsed().as_millis() as u64,
            reason,
            seed,
            screenshots: screenshots.take_artifacts(),
        }
    }

    /// Run `scenario` on an already open browser session, then close it.
    ///
    /// Sets the viewport, enforces the scenario timeout and captures a
    /// `<name>-failure` screenshot when the scenario errors.
    pub async fn run_on_session(
        &self,
        scenario: &dyn Scenario,
        page: PlaywrightHandle,
        report: &TestReport,
        screenshots: &mut ScreenshotStore,
        seed: u64,
    ) -> E2eResult<Outcome> {
        let pw = &self.config.playwright;
        let settings = self.config.scenario_settings();

        let result = match page.set_viewport_size(pw.viewport_width, pw.viewport_height).await {
            Ok(()) => {
                let mut ctx = ScenarioContext {
                    scenario: scenario.name(),
                    page: &page,
                    report,
                    screenshots: &mut *screenshots,
                    settings: &settings,
                    rng: StdRng::seed_from_u64(seed),
                };

                match tokio::time::timeout(scenario.timeout(), scenario.run(&mut ctx)).await {
                    Ok(result) => result,
                    Err(_) => Err(E2eError::Timeout(format!(
                        "scenario '{}' exceeded {}s",
                        scenario.name(),
                        scenario.timeout().as_secs()
                    ))),
                }
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            if let Err(log_err) = report.write(format!("Scenario {} aborted: {}", scenario.name(), e)) {
                warn!("Report line not written: {}", log_err);
            }
            let name = format!("{}-failure", scenario.name());
            if let Err(shot_err) = screenshots.capture(&page, &name).await {
                warn!("Failure screenshot not captured: {}", shot_err);
            }
        }

        if let Err(e) = page.close().await {
            warn!("Browser did not close cleanly: {}", e);
        }

        result
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestRunner {
    fn drop(&mut self) {
        let _ = self.stop_server();
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub server: ServerConfig,
    pub playwright: PlaywrightConfig,

    /// Text log, truncated at the start of every run
    pub report_path: PathBuf,

    pub screenshot_dir: PathBuf,

    /// Directory for `test-results.json`
    pub output_dir: PathBuf,

    pub candidates: CandidatePool,
    pub title_check: TitleCheck,

    /// Fixed seed for reproducible random choices (None = fresh per run)
    pub seed: Option<u64>,

    /// Tags skipped by `run_all`
    pub exclude_tags: Vec<String>,
}

impl RunnerConfig {
    /// Per-scenario inputs derived from this config
    pub fn scenario_settings(&self) -> ScenarioSettings {
        ScenarioSettings {
            base_url: self.server.base_url.clone(),
            candidates: self.candidates.clone(),
            title_check: self.title_check.clone(),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            playwright: PlaywrightConfig::default(),
            report_path: PathBuf::from("test-results/test-report.txt"),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            output_dir: PathBuf::from("test-results"),
            candidates: CandidatePool::builtin().unwrap_or_default(),
            title_check: TitleCheck::default(),
            seed: None,
            exclude_tags: vec!["external".to_string()],
        }
    }
}
