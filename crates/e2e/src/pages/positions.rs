//! Positions list

use rand::Rng;

use crate::error::{E2eError, E2eResult};
use crate::locator::{Locator, NamePattern};
use crate::pages::CARD_TITLE;
use crate::playwright::{PlaywrightHandle, WaitState};

const SEARCH_INPUT: &str =
    r#"input[placeholder*="Buscar por título"], input[placeholder*="busca por titulo"]"#;
const POSITION_CARD: &str = "div.card, article.card";

pub struct PositionsPage<'p> {
    page: &'p PlaywrightHandle,
}

impl<'p> PositionsPage<'p> {
    pub fn new(page: &'p PlaywrightHandle) -> Self {
        Self { page }
    }

    pub async fn wait_for_search_input(&self) -> E2eResult<()> {
        self.page
            .wait_for_selector(SEARCH_INPUT, WaitState::Visible, None)
            .await
    }

    pub async fn position_cards(&self) -> E2eResult<Vec<Locator<'p>>> {
        self.page.locator(POSITION_CARD).all().await
    }

    async fn non_empty_cards(&self) -> E2eResult<Vec<Locator<'p>>> {
        let cards = self.position_cards().await?;
        if cards.is_empty() {
            return Err(E2eError::ElementNotFound("no position cards found".to_string()));
        }
        Ok(cards)
    }

    pub async fn random_position_card<R: Rng + ?Sized>(&self, rng: &mut R) -> E2eResult<Locator<'p>> {
        let mut cards = self.non_empty_cards().await?;
        let index = rng.gen_range(0..cards.len());
        Ok(cards.swap_remove(index))
    }

    pub async fn first_position_card(&self) -> E2eResult<Locator<'p>> {
        let mut cards = self.non_empty_cards().await?;
        Ok(cards.swap_remove(0))
    }

    pub async fn position_title(&self, card: &Locator<'p>) -> E2eResult<Option<String>> {
        card.locator(CARD_TITLE).first().text_content().await
    }

    pub async fn click_view_process(&self, card: &Locator<'p>) -> E2eResult<()> {
        card.get_by_role("button", Some(NamePattern::contains_ignore_case("ver proceso")))
            .click()
            .await
    }

    /// First card whose title text equals `title` exactly
    pub async fn find_card_by_title(&self, title: Option<&str>) -> E2eResult<Option<Locator<'p>>> {
        for card in self.position_cards().await? {
            let card_title = self.position_title(&card).await?;
            if card_title.as_deref() == title {
                return Ok(Some(card));
            }
        }
        Ok(None)
    }
}
