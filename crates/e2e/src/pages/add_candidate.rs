//! New candidate form

use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::fixtures::Candidate;
use crate::locator::NamePattern;
use crate::playwright::{PlaywrightHandle, WaitState};

const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;
const SUCCESS_ALERT: &str = r#"div.alert-success:has-text("Candidato añadido con éxito")"#;
const ERROR_ALERT: &str = "div.alert-danger";
const BACK_CONTROL: &str = r#"button:has-text("Volver"), a:has-text("Volver")"#;

/// How long the success alert gets to show up after submitting
pub const SUCCESS_TIMEOUT_MS: u64 = 10_000;

pub struct AddCandidatePage<'p> {
    page: &'p PlaywrightHandle,
}

impl<'p> AddCandidatePage<'p> {
    pub fn new(page: &'p PlaywrightHandle) -> Self {
        Self { page }
    }

    pub async fn wait_for_submit_button(&self) -> E2eResult<()> {
        self.page
            .wait_for_selector(SUBMIT_BUTTON, WaitState::Visible, None)
            .await
    }

    pub async fn fill_candidate_form(&self, candidate: &Candidate) -> E2eResult<()> {
        let fields = [
            ("Nombre", &candidate.first_name),
            ("Apellido", &candidate.last_name),
            ("Correo Electrónico", &candidate.email),
            ("Teléfono", &candidate.phone),
            ("Dirección", &candidate.address),
        ];

        for (label, value) in fields {
            self.page.get_by_label(label).fill(value).await?;
        }
        Ok(())
    }

    pub async fn submit(&self) -> E2eResult<()> {
        self.page
            .get_by_role("button", Some(NamePattern::contains_ignore_case("enviar")))
            .click()
            .await
    }

    /// `false` when the success alert never appears; bridge failures still propagate
    pub async fn wait_for_success_message(&self) -> E2eResult<bool> {
        match self
            .page
            .wait_for_selector(SUCCESS_ALERT, WaitState::Visible, Some(SUCCESS_TIMEOUT_MS))
            .await
        {
            Ok(()) => Ok(true),
            Err(E2eError::Playwright(reason)) => {
                debug!("Success alert not shown: {}", reason);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Text of the first error alert, if one is visible
    pub async fn error_message(&self) -> E2eResult<Option<String>> {
        let alert = self.page.locator(ERROR_ALERT).first();
        if alert.is_visible().await? {
            return alert.text_content().await;
        }
        Ok(None)
    }

    /// Use the form's own back control when present, browser history otherwise
    pub async fn go_back(&self) -> E2eResult<()> {
        let back = self.page.locator(BACK_CONTROL).first();
        if back.is_visible().await? {
            back.click().await
        } else {
            self.page.go_back().await
        }
    }
}
