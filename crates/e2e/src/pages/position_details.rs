//! Position pipeline board
//!
//! The board renders one column per hiring stage. Each column is a
//! `col-md-*` wrapper around a card whose body lists candidate cards; a
//! candidate card is any `.card` with a `.card-title` inside that body.

use rand::Rng;
use tracing::{debug, warn};

use crate::error::{E2eError, E2eResult};
use crate::locator::{Locator, NamePattern};
use crate::pages::CARD_TITLE;
use crate::playwright::{PlaywrightHandle, WaitState};

const VIEW_POSITIONS_MARKER: &str =
    r#"h2:has-text("Ver Posiciones"), button:has-text("Volver a Posiciones")"#;
const STAGE_COLUMN: &str = r#"div[class*="col-md"]"#;
const COLUMN_BODY: &str = ".card-body";
const CANDIDATE_CARD: &str = ".card:has(.card-title)";
const COLUMN_HEADER: &str = r#"div[class*="card-header"], .card-header"#;

/// Mouse move interpolation steps while dragging
pub const DRAG_STEPS: u32 = 10;

/// Settle time after a drop for the board to animate and persist the move
pub const DROP_SETTLE_MS: u64 = 2_000;

/// Column after `current`, wrapping from the last column back to the first
pub fn next_column_index(current: usize, total: usize) -> usize {
    if total == 0 || current + 1 >= total {
        0
    } else {
        current + 1
    }
}

pub struct PositionDetailsPage<'p> {
    page: &'p PlaywrightHandle,
}

impl<'p> PositionDetailsPage<'p> {
    pub fn new(page: &'p PlaywrightHandle) -> Self {
        Self { page }
    }

    pub async fn wait_for_view_positions_element(&self) -> E2eResult<()> {
        self.page
            .wait_for_selector(VIEW_POSITIONS_MARKER, WaitState::Visible, None)
            .await
    }

    /// Stage columns, left to right
    pub async fn columns(&self) -> E2eResult<Vec<Locator<'p>>> {
        self.page.locator(STAGE_COLUMN).all().await
    }

    fn candidate_cards(column: &Locator<'p>) -> Locator<'p> {
        column.locator(COLUMN_BODY).first().locator(CANDIDATE_CARD)
    }

    pub async fn candidate_count(&self, column: &Locator<'p>) -> E2eResult<usize> {
        Self::candidate_cards(column).count().await
    }

    /// First column, scanning from the left, holding at least one candidate
    pub async fn column_with_candidates(&self) -> E2eResult<Option<(Locator<'p>, usize)>> {
        for (index, column) in self.columns().await?.into_iter().enumerate() {
            if self.candidate_count(&column).await? > 0 {
                return Ok(Some((column, index)));
            }
        }
        Ok(None)
    }

    pub async fn random_candidate_from_column<R: Rng + ?Sized>(
        &self,
        column: &Locator<'p>,
        rng: &mut R,
    ) -> E2eResult<Locator<'p>> {
        let mut candidates = Self::candidate_cards(column).all().await?;
        if candidates.is_empty() {
            return Err(E2eError::ElementNotFound(
                "no candidates in column".to_string(),
            ));
        }
        let index = rng.gen_range(0..candidates.len());
        Ok(candidates.swap_remove(index))
    }

    /// Trimmed card title; `None` when the card has no visible text
    pub async fn candidate_name(&self, candidate: &Locator<'p>) -> E2eResult<Option<String>> {
        let text = candidate.locator(CARD_TITLE).first().text_content().await?;
        Ok(text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    pub async fn column_header(&self, column: &Locator<'p>) -> E2eResult<Option<String>> {
        column.locator(COLUMN_HEADER).first().text_content().await
    }

    /// Drag `candidate` onto the centre of `target` with the mouse.
    ///
    /// Returns `false` without touching the mouse when either element has
    /// no layout box.
    pub async fn drag_to(&self, candidate: &Locator<'p>, target: &Locator<'p>) -> E2eResult<bool> {
        let candidate_box = candidate.bounding_box().await?;
        let target_box = target.bounding_box().await?;

        let (Some(_), Some(target_box)) = (candidate_box, target_box) else {
            warn!("Drag skipped: candidate or target column has no bounding box");
            return Ok(false);
        };

        let (x, y) = target_box.center();
        debug!("Dragging candidate to ({:.0}, {:.0})", x, y);

        candidate.hover().await?;
        self.page.mouse_down().await?;
        self.page.mouse_move(x, y, DRAG_STEPS).await?;
        self.page.mouse_up().await?;
        self.page.wait_for_timeout(DROP_SETTLE_MS).await;
        Ok(true)
    }

    /// Drag `candidate` from column `current` into the next column.
    ///
    /// Returns the target index, or `None` when the drag could not start.
    pub async fn move_candidate_to_next_column(
        &self,
        candidate: &Locator<'p>,
        current: usize,
        total: usize,
    ) -> E2eResult<Option<usize>> {
        let next = next_column_index(current, total);
        let target = self.page.locator(STAGE_COLUMN).nth(next);
        if self.drag_to(candidate, &target).await? {
            Ok(Some(next))
        } else {
            Ok(None)
        }
    }

    /// Whether column `index` mentions `candidate_name`; out-of-range is `false`
    pub async fn verify_candidate_in_column(&self, candidate_name: &str, index: usize) -> E2eResult<bool> {
        let candidate_name = candidate_name.trim();
        if candidate_name.is_empty() {
            return Ok(false);
        }
        let columns = self.columns().await?;
        let Some(column) = columns.get(index) else {
            return Ok(false);
        };
        let text = column.text_content().await?;
        Ok(text.map(|t| t.contains(candidate_name)).unwrap_or(false))
    }

    pub async fn go_back_to_positions(&self) -> E2eResult<()> {
        self.page
            .get_by_role(
                "button",
                Some(NamePattern::contains_ignore_case("volver a posiciones")),
            )
            .click()
            .await
    }
}
