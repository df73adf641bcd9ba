//! Lazy element locators
//!
//! A locator is a chain of query parts that the bridge resolves against the
//! live page every time an action runs, the same way Playwright locators do.
//! Nothing is cached between calls, so a locator stays valid across
//! re-renders and navigations.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{E2eError, E2eResult};
use crate::playwright::PlaywrightHandle;

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocatorPart {
    Css { selector: String },
    Role {
        role: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<NamePattern>,
    },
    Label { text: String },
    First,
    Nth { index: usize },
}

/// Accessible-name matcher, sent to the bridge as a JavaScript `RegExp`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamePattern {
    pub pattern: String,
    pub flags: String,
}

impl NamePattern {
    /// Case-insensitive substring match on the literal `text`
    pub fn contains_ignore_case(text: &str) -> Self {
        Self {
            pattern: regex::escape(text),
            flags: "i".to_string(),
        }
    }
}

/// Element geometry in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A locator bound to a browser session
#[derive(Clone)]
pub struct Locator<'p> {
    page: &'p PlaywrightHandle,
    parts: Vec<LocatorPart>,
}

impl<'p> Locator<'p> {
    pub(crate) fn new(page: &'p PlaywrightHandle, part: LocatorPart) -> Self {
        Self {
            page,
            parts: vec![part],
        }
    }

    fn chain(&self, part: LocatorPart) -> Self {
        let mut parts = self.parts.clone();
        parts.push(part);
        Self {
            page: self.page,
            parts,
        }
    }

    /// The wire form of this locator
    pub fn parts(&self) -> &[LocatorPart] {
        &self.parts
    }

    pub fn locator(&self, selector: &str) -> Self {
        self.chain(LocatorPart::Css {
            selector: selector.to_string(),
        })
    }

    pub fn get_by_role(&self, role: &str, name: Option<NamePattern>) -> Self {
        self.chain(LocatorPart::Role {
            role: role.to_string(),
            name,
        })
    }

    pub fn get_by_label(&self, text: &str) -> Self {
        self.chain(LocatorPart::Label {
            text: text.to_string(),
        })
    }

    pub fn first(&self) -> Self {
        self.chain(LocatorPart::First)
    }

    pub fn nth(&self, index: usize) -> Self {
        self.chain(LocatorPart::Nth { index })
    }

    async fn call(&self, method: &str, mut params: serde_json::Value) -> E2eResult<serde_json::Value> {
        params["locator"] = serde_json::to_value(&self.parts)?;
        self.page.call(method, params).await
    }

    pub async fn click(&self) -> E2eResult<()> {
        self.call("click", json!({})).await?;
        Ok(())
    }

    pub async fn fill(&self, value: &str) -> E2eResult<()> {
        self.call("fill", json!({ "value": value })).await?;
        Ok(())
    }

    pub async fn hover(&self) -> E2eResult<()> {
        self.call("hover", json!({})).await?;
        Ok(())
    }

    /// `textContent` of the element, `None` when the DOM reports null
    pub async fn text_content(&self) -> E2eResult<Option<String>> {
        let value = self.call("text_content", json!({})).await?;
        Ok(value.as_str().map(String::from))
    }

    pub async fn is_visible(&self) -> E2eResult<bool> {
        let value = self.call("is_visible", json!({})).await?;
        value
            .as_bool()
            .ok_or_else(|| E2eError::Protocol(format!("is_visible returned {}", value)))
    }

    pub async fn count(&self) -> E2eResult<usize> {
        let value = self.call("count", json!({})).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| E2eError::Protocol(format!("count returned {}", value)))
    }

    /// One locator per currently matching element, like Playwright's `all()`
    pub async fn all(&self) -> E2eResult<Vec<Locator<'p>>> {
        let count = self.count().await?;
        Ok((0..count).map(|i| self.nth(i)).collect())
    }

    /// `None` when the element is not rendered
    pub async fn bounding_box(&self) -> E2eResult<Option<BoundingBox>> {
        let value = self.call("bounding_box", json!({})).await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

impl std::fmt::Debug for Locator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.parts).finish()
    }
}
