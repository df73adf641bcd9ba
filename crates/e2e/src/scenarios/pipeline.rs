//! Steps shared by the pipeline scenarios

use serde::{Deserialize, Serialize};

use crate::error::E2eResult;
use crate::pages::{DashboardPage, PositionDetailsPage, PositionsPage};
use crate::scenarios::{Outcome, ScenarioContext};

/// A candidate moved on the board, remembered for re-checking after navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMove {
    pub candidate_name: String,
    pub from_column: usize,
    pub to_column: usize,
}

pub(crate) const DRAG_SKIPPED: &str = "drag skipped: candidate or target column has no bounding box";

/// Dashboard -> positions list, ready for card selection
pub(crate) async fn open_positions(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let dashboard = DashboardPage::new(ctx.page, &ctx.settings.base_url);
    let positions = PositionsPage::new(ctx.page);

    dashboard.goto().await?;
    ctx.screenshot("dashboard").await?;

    dashboard.click_go_to_positions().await?;
    ctx.log(r#"Clicked "Ir a posiciones""#)?;
    ctx.screenshot("positions").await?;

    positions.wait_for_search_input().await?;
    ctx.log("Position search input visible")?;
    Ok(())
}

pub(crate) fn display_title(title: Option<&str>) -> &str {
    title.unwrap_or("<untitled>")
}

/// Leave the board, reopen the same position and check the moved candidate
/// is still in the column it was dropped on
pub(crate) async fn reopen_and_verify(
    ctx: &mut ScenarioContext<'_>,
    position_title: Option<&str>,
    moved: &StageMove,
) -> E2eResult<Outcome> {
    let positions = PositionsPage::new(ctx.page);
    let details = PositionDetailsPage::new(ctx.page);

    details.go_back_to_positions().await?;
    ctx.log(r#"Clicked "Volver a posiciones""#)?;
    ctx.screenshot("back-to-positions").await?;

    positions.wait_for_search_input().await?;

    let Some(card) = positions.find_card_by_title(position_title).await? else {
        let title = display_title(position_title);
        ctx.log(format!(r#"Error: position card "{}" not found"#, title))?;
        ctx.screenshot("position-not-found").await?;
        return Ok(Outcome::Failed(format!(
            r#"position card "{}" not found after returning"#,
            title
        )));
    };

    positions.click_view_process(&card).await?;
    ctx.log(format!(
        r#"Clicked "Ver proceso" again for: {}"#,
        display_title(position_title)
    ))?;
    ctx.screenshot("position-details-again").await?;

    details.wait_for_view_positions_element().await?;

    if moved.candidate_name.trim().is_empty() {
        ctx.log("Moved candidate card has no name, cannot verify its column")?;
        ctx.screenshot("verification-failed").await?;
        return Ok(Outcome::Failed("moved candidate card has no title".to_string()));
    }

    let in_place = details
        .verify_candidate_in_column(&moved.candidate_name, moved.to_column)
        .await?;

    if in_place {
        ctx.log("Success: the candidate is in the expected column")?;
        ctx.screenshot("verification-passed").await?;
        Ok(Outcome::Passed)
    } else {
        ctx.log("Unexpected result: the candidate is not in the expected column")?;
        ctx.screenshot("verification-failed").await?;
        Ok(Outcome::Failed(format!(
            r#"candidate "{}" not found in column {}"#,
            moved.candidate_name,
            moved.to_column + 1
        )))
    }
}
