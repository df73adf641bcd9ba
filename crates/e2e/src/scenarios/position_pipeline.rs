//! Move a random candidate of a random position one stage forward

use async_trait::async_trait;
use std::time::Duration;

use crate::error::E2eResult;
use crate::pages::{PositionDetailsPage, PositionsPage};
use crate::scenarios::pipeline::{
    display_title, open_positions, reopen_and_verify, StageMove, DRAG_SKIPPED,
};
use crate::scenarios::{Outcome, Scenario, ScenarioContext};

pub struct PositionPipeline;

#[async_trait]
impl Scenario for PositionPipeline {
    fn name(&self) -> &'static str {
        "position-pipeline"
    }

    fn description(&self) -> &'static str {
        "Drag a candidate from the first non-empty stage to the next one and check it stays there"
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

        ctx.log("Test start: position pipeline")?;
        open_positions(ctx).await?;

        let card = positions.random_position_card(&mut ctx.rng).await?;
        let title = positions.position_title(&card).await?;
        ctx.log(format!("Selected position card: {}", display_title(title.as_deref())))?;
        ctx.screenshot("position-selected").await?;

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

        let mut total = 0;
        for (i, column) in columns.iter().enumerate() {
            let count = details.candidate_count(column).await?;
            ctx.log(format!("Stage {}: {} candidates", i + 1, count))?;
            total += count;
        }
        ctx.log(format!("Candidates across all stages: {}", total))?;

        if total == 0 {
            ctx.log("No candidates in any stage, nothing to move")?;
            ctx.screenshot("no-candidates").await?;
            return Ok(Outcome::Skipped("no candidates in any stage".to_string()));
        }

        ctx.log("Looking for the first stage holding candidates")?;
        let Some((column, index)) = details.column_with_candidates().await? else {
            ctx.log("Error: no stage holds candidates although the total was positive")?;
            ctx.screenshot("stage-search-failed").await?;
            return Ok(Outcome::Failed(
                "candidates disappeared while scanning stages".to_string(),
            ));
        };
        let count = details.candidate_count(&column).await?;
        ctx.log(format!(
            "First stage with candidates: stage {} (index {}) with {} candidates",
            index + 1,
            index,
            count
        ))?;
        ctx.screenshot("stage-with-candidates").await?;

        let candidate = details
            .random_candidate_from_column(&column, &mut ctx.rng)
            .await?;
        let name = details.candidate_name(&candidate).await?.unwrap_or_default();
        ctx.log(format!("Candidate selected to move: {}", name))?;
        ctx.screenshot("candidate-selected").await?;

        let Some(to) = details
            .move_candidate_to_next_column(&candidate, index, columns.len())
            .await?
        else {
            ctx.log("Error: the candidate card could not be dragged")?;
            ctx.screenshot("drag-skipped").await?;
            return Ok(Outcome::Failed(DRAG_SKIPPED.to_string()));
        };
        ctx.log(format!(
            "Candidate moved from stage {} to stage {}",
            index + 1,
            to + 1
        ))?;
        ctx.screenshot("candidate-moved").await?;

        let moved = StageMove {
            candidate_name: name,
            from_column: index,
            to_column: to,
        };
        ctx.log(format!(
            r#"Remembered: candidate "{}" moved to stage {}"#,
            moved.candidate_name,
            moved.to_column + 1
        ))?;

        let outcome = reopen_and_verify(ctx, title.as_deref(), &moved).await?;
        ctx.log("Test finished: position pipeline")?;
        Ok(outcome)
    }
}
