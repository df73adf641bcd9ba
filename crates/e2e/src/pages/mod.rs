//! Page objects for the ATS frontend
//!
//! Each page object borrows the live [`PlaywrightHandle`] and exposes the UI
//! actions a scenario needs, named after what the user does. Selectors and
//! accessible names match the Spanish UI of the application.

pub mod add_candidate;
pub mod dashboard;
pub mod position_details;
pub mod positions;

pub use add_candidate::AddCandidatePage;
pub use dashboard::DashboardPage;
pub use position_details::{next_column_index, PositionDetailsPage};
pub use positions::PositionsPage;

/// Heading-ish element holding the title of a card
pub(crate) const CARD_TITLE: &str = r#"h5, .card-title, [class*="title"]"#;
