//! Test scenarios
//!
//! A scenario is an ordered sequence of page-object calls. It writes its
//! progress to the text report, captures screenshots along the way and ends
//! with an [`Outcome`]. Errors from the browser propagate and fail the
//! scenario; situations the scenario cannot exercise (an empty board) are
//! reported as skipped.

pub mod add_candidate;
pub mod page_title;
pub mod pipeline;
pub mod position_pipeline;
pub mod second_column;

use async_trait::async_trait;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::E2eResult;
use crate::fixtures::CandidatePool;
use crate::playwright::PlaywrightHandle;
use crate::report::{ScreenshotStore, TestReport};

pub use add_candidate::AddCandidate;
pub use page_title::{PageTitle, TitleCheck};
pub use pipeline::StageMove;
pub use position_pipeline::PositionPipeline;
pub use second_column::SecondColumnPipeline;

/// How a scenario ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed(String),
    Skipped(String),
}

/// Scenario inputs that do not change between runs
#[derive(Debug, Clone)]
pub struct ScenarioSettings {
    /// Root URL of the application under test
    pub base_url: String,
    pub candidates: CandidatePool,
    pub title_check: TitleCheck,
}

/// Everything a running scenario can touch
pub struct ScenarioContext<'a> {
    pub scenario: &'static str,
    pub page: &'a PlaywrightHandle,
    pub report: &'a TestReport,
    pub screenshots: &'a mut ScreenshotStore,
    pub settings: &'a ScenarioSettings,
    pub rng: StdRng,
}

impl<'a> ScenarioContext<'a> {
    pub fn log(&self, message: impl AsRef<str>) -> E2eResult<()> {
        self.report.write(message)
    }

    /// Full-page screenshot named `<scenario>-<step>`
    pub async fn screenshot(&mut self, step: &str) -> E2eResult<()> {
        let name = format!("{}-{}", self.scenario, step);
        self.screenshots.capture(self.page, &name).await?;
        Ok(())
    }
}

#[async_trait]
pub trait Scenario: Send + Sync {
    /// Unique, kebab-case
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn tags(&self) -> &'static [&'static str] {
        &[]
    }

    /// Wall-clock budget for the whole scenario
    fn timeout(&self) -> Duration;

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> E2eResult<Outcome>;
}

/// Every scenario, in execution order
pub fn all() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(AddCandidate),
        Box::new(PositionPipeline),
        Box::new(SecondColumnPipeline),
        Box::new(PageTitle),
    ]
}

/// Which scenarios a run selects
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    pub name: Option<String>,
    pub tag: Option<String>,

    /// Tags left out unless asked for by name or tag
    pub exclude_tags: Vec<String>,
}

impl ScenarioFilter {
    pub fn matches(&self, scenario: &dyn Scenario) -> bool {
        let tags = scenario.tags();

        if let Some(name) = &self.name {
            return scenario.name() == name;
        }

        if let Some(tag) = &self.tag {
            return tags.contains(&tag.as_str());
        }

        !tags
            .iter()
            .any(|t| self.exclude_tags.iter().any(|excluded| excluded == t))
    }
}
