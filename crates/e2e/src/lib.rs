//! ATS E2E Test Suite
//!
//! Browser end-to-end tests for the applicant tracking system frontend:
//! - Waits for (or spawns) the application and health-checks it
//! - Drives one Playwright page per scenario through a JSON-lines bridge
//! - Wraps each screen in a page object
//! - Logs every step to a text report and captures full-page screenshots
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── start_server() -> ServerHandle                       │
//! │    ├── PlaywrightHandle::launch() per scenario              │
//! │    ├── Scenario::run(ctx) -> Outcome                        │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page objects                                               │
//! │    ├── DashboardPage                                        │
//! │    ├── AddCandidatePage                                     │
//! │    ├── PositionsPage                                        │
//! │    └── PositionDetailsPage (stage columns, drag and drop)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestReport (timestamped text log) + ScreenshotStore        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod fixtures;
pub mod locator;
pub mod pages;
pub mod playwright;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod server;
pub mod settings;

pub use error::{E2eError, E2eResult};
pub use runner::{RunnerConfig, TestRunner, TestSuiteResult};
pub use scenarios::{Outcome, Scenario};
