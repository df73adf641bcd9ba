//! Move a candidate out of the second stage of the first position

use async_trait::async_trait;
use std::time::Duration;

use crate::error::E2eResult;
use crate::pages::{next_column_index, PositionDetailsPage, PositionsPage};
use crate::scenarios::pipeline::{
    display_title, open_positions, reopen_and_verify, StageMove, DRAG_SKIPPED,
};
use crate::scenarios::{Outcome, Scenario, ScenarioContext};

/// Zero-based index of the stage this scenario works on
const SECOND_COLUMN: usize = 1;

pub struct SecondColumnPipeline;

#[async_trait]
impl Scenario for SecondColumnPipeline {
    fn name(&self) -> &'static str {
        "second-column-pipeline"
    }

    fn description(&self) -> &'static str {
        "Drag a candidate from the second stage of the first position to the next stage"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["pipeline"]
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(120)
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> E2eResult<Outcome> {
        let positions = PositionsPage::new(ctx.page);
        let details = PositionDetailsPage::new(ctx.page);

        ctx.log("Test start: position pipeline (second column)")?;
        open_positions(ctx).await?;

        let card = positions.first_position_card().await?;
        let title = positions.position_title(&card).await?;
        ctx.log(format!("First position selected: {}", display_title(title.as_deref())))?;
        ctx.screenshot("first-position-selected").await?;

        positions.click_view_process(&card).await?;
        ctx.log(format!(
            r#"Clicked "Ver proceso" for: {}"#,
            display_title(title.as_deref())
        ))?;
        ctx.screenshot("position-details").await?;

        details.wait_for_view_positions_element().await?;
        ctx.log("Position board visible")?;

        let columns = details.columns().await?;
        ctx.log(format!("Columns found: {}", columns.len()))?;

        if columns.len() <= SECOND_COLUMN {
            ctx.log("Error: fewer than 2 columns on the board")?;
            ctx.screenshot("too-few-columns").await?;
            return Ok(Outcome::Skipped("board has fewer than 2 columns".to_string()));
        }

        let second = &columns[SECOND_COLUMN];
        let header = details.column_header(second).await?.unwrap_or_default();
        ctx.log(format!(
            r#"Working with the second column (index {}): "{}""#,
            SECOND_COLUMN,
            header.trim()
        ))?;
        ctx.screenshot("second-column").await?;

        let count = details.candidate_count(second).await?;
        ctx.log(format!(
            "Candidates in the second column (index {}): {}",
            SECOND_COLUMN, count
        ))?;

        if count == 0 {
            ctx.log("The second column has no candidates, cannot continue")?;
            ctx.screenshot("second-column-empty").await?;
            return Ok(Outcome::Skipped("second column is empty".to_string()));
        }

        let candidate = details
            .random_candidate_from_column(second, &mut ctx.rng)
            .await?;
        let name = details.candidate_name(&candidate).await?.unwrap_or_default();
        ctx.log(format!("Candidate selected from the second column: {}", name))?;
        ctx.screenshot("candidate-selected").await?;

        let to = next_column_index(SECOND_COLUMN, columns.len());
        ctx.log(format!(
            "Moving candidate from column {} to column {}",
            SECOND_COLUMN + 1,
            to + 1
        ))?;

        if !details.drag_to(&candidate, &columns[to]).await? {
            ctx.log("Error: the candidate card could not be dragged")?;
            ctx.screenshot("drag-skipped").await?;
            return Ok(Outcome::Failed(DRAG_SKIPPED.to_string()));
        }
        ctx.log(format!("Candidate moved to column {}", to + 1))?;
        ctx.screenshot("candidate-moved").await?;

        let moved = StageMove {
            candidate_name: name,
            from_column: SECOND_COLUMN,
            to_column: to,
        };
        ctx.log(format!(
            r#"Remembered: candidate "{}" in column {}"#,
            moved.candidate_name,
            moved.to_column + 1
        ))?;

        let outcome = reopen_and_verify(ctx, title.as_deref(), &moved).await?;
        ctx.log("Test finished: position pipeline (second column)")?;
        Ok(outcome)
    }
}
