//! Smoke check that the browser stack works end to end

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::E2eResult;
use crate::scenarios::{Outcome, Scenario, ScenarioContext};

/// Page whose title is checked, and the pattern it must match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleCheck {
    pub url: String,
    pub pattern: String,
}

impl Default for TitleCheck {
    fn default() -> Self {
        Self {
            url: "https://playwright.dev/".to_string(),
            pattern: "Playwright".to_string(),
        }
    }
}

impl TitleCheck {
    pub fn matches(&self, title: &str) -> E2eResult<bool> {
        Ok(Regex::new(&self.pattern)?.is_match(title))
    }
}

pub struct PageTitle;

#[async_trait]
impl Scenario for PageTitle {
    fn name(&self) -> &'static str {
        "page-title"
    }

    fn description(&self) -> &'static str {
        "Open a public page and check its title"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["smoke", "external"]
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> E2eResult<Outcome> {
        let check = ctx.settings.title_check.clone();

        ctx.page.goto(&check.url).await?;
        let title = ctx.page.title().await?;
        ctx.log(format!("Title of {}: {}", check.url, title))?;

        if check.matches(&title)? {
            Ok(Outcome::Passed)
        } else {
            ctx.screenshot("title-mismatch").await?;
            Ok(Outcome::Failed(format!(
                "title {:?} does not match /{}/",
                title, check.pattern
            )))
        }
    }
}
