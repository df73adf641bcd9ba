//! Add a new candidate from the dashboard

use async_trait::async_trait;
use std::time::Duration;

use crate::error::E2eResult;
use crate::pages::{AddCandidatePage, DashboardPage};
use crate::scenarios::{Outcome, Scenario, ScenarioContext};

pub struct AddCandidate;

#[async_trait]
impl Scenario for AddCandidate {
    fn name(&self) -> &'static str {
        "add-candidate"
    }

    fn description(&self) -> &'static str {
        "Fill and submit the new candidate form, then return to the dashboard"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["candidates"]
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> E2eResult<Outcome> {
        let dashboard = DashboardPage::new(ctx.page, &ctx.settings.base_url);
        let form = AddCandidatePage::new(ctx.page);

        ctx.log("Test start: add a new candidate")?;

        dashboard.goto().await?;
        ctx.screenshot("dashboard").await?;

        dashboard.click_add_candidate().await?;
        ctx.log(r#"Clicked "Añadir nuevo candidato""#)?;
        ctx.screenshot("candidate-form").await?;

        form.wait_for_submit_button().await?;
        ctx.log(r#""Enviar" button visible"#)?;

        let candidate = ctx.settings.candidates.choose(&mut ctx.rng)?.clone();
        ctx.log(format!(
            "Selected candidate data: {}",
            serde_json::to_string(&candidate)?
        ))?;

        form.fill_candidate_form(&candidate).await?;
        ctx.screenshot("form-filled").await?;
        ctx.log("Form fields filled")?;

        form.submit().await?;
        ctx.log(r#"Clicked "Enviar""#)?;
        ctx.screenshot("after-submit").await?;

        // The flow continues either way; the verdict is returned at the end
        let outcome = if form.wait_for_success_message().await? {
            ctx.log("Success: candidate added")?;
            ctx.screenshot("success-message").await?;
            Outcome::Passed
        } else {
            let error = form
                .error_message()
                .await?
                .unwrap_or_else(|| "unknown error".to_string());
            ctx.log(format!("Adding candidate failed: {}", error))?;
            ctx.screenshot("error-message").await?;
            Outcome::Failed(format!(
                "candidate {} was not added: {}",
                candidate.full_name(),
                error
            ))
        };

        form.go_back().await?;
        ctx.log("Navigated back")?;
        ctx.screenshot("after-back").await?;

        dashboard.wait_for_add_candidate_button().await?;
        ctx.log(r#""Añadir nuevo candidato" button visible again"#)?;

        ctx.log("Test finished")?;
        ctx.screenshot("final").await?;

        Ok(outcome)
    }
}
