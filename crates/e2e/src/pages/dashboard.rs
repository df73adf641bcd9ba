//! Landing page

use crate::error::E2eResult;
use crate::locator::NamePattern;
use crate::playwright::{PlaywrightHandle, WaitState};

const ADD_CANDIDATE_BUTTON: &str = r#"button:has-text("Añadir Nuevo Candidato")"#;

pub struct DashboardPage<'p> {
    page: &'p PlaywrightHandle,
    base_url: String,
}

impl<'p> DashboardPage<'p> {
    pub fn new(page: &'p PlaywrightHandle, base_url: &str) -> Self {
        Self {
            page,
            base_url: base_url.to_string(),
        }
    }

    /// Open the dashboard and wait for the network to go idle
    pub async fn goto(&self) -> E2eResult<()> {
        self.page.goto(&self.base_url).await?;
        self.page.wait_for_load_state("networkidle").await
    }

    pub async fn click_add_candidate(&self) -> E2eResult<()> {
        self.page
            .get_by_role(
                "button",
                Some(NamePattern::contains_ignore_case("añadir nuevo candidato")),
            )
            .click()
            .await
    }

    pub async fn click_go_to_positions(&self) -> E2eResult<()> {
        self.page
            .get_by_role("button", Some(NamePattern::contains_ignore_case("ir a posiciones")))
            .click()
            .await
    }

    pub async fn wait_for_add_candidate_button(&self) -> E2eResult<()> {
        self.page
            .wait_for_selector(ADD_CANDIDATE_BUTTON, WaitState::Visible, None)
            .await
    }
}
