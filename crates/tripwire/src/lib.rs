//! Tripwire: end-to-end UI verification for the trip planner
//!
//! Drives a real browser through scripted scenarios, waits on observable
//! page conditions instead of fixed sleeps, and leaves a trail of named
//! screenshots behind.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    TRIPWIRE Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Session    │    │ State      │    │ Condition  │            │
//! │   │ Bootstrap  │───►│ Driver     │◄──►│ Prober     │            │
//! │   │ (open)     │    │ (actions)  │    │ (probe)    │            │
//! │   └────────────┘    └─────┬──────┘    └─────┬──────┘            │
//! │                           ▼                 ▼                   │
//! │                    ┌──────────────────────────────┐             │
//! │                    │ Evidence Capture (artifacts) │             │
//! │                    └──────────────────────────────┘             │
//! │   PageDriver: ChromiumDriver (CDP) │ MockDriver (tests)         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tripwire::scenarios::SidebarScrollLock;
//! use tripwire::{HarnessConfig, MockDriver, MockLauncher, ScenarioRunner};
//!
//! # async fn demo() {
//! let runner = ScenarioRunner::new(MockLauncher::new(MockDriver::new()), HarnessConfig::default());
//! let report = runner.run(&SidebarScrollLock).await;
//! println!("{}: passed={}", report.name, report.passed);
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod action;
pub mod browser;
pub mod capture;
pub mod config;
pub mod driver;
pub mod harness;
pub mod locator;
pub mod result;
pub mod scenarios;
pub mod session;
pub mod wait;

pub use action::{DragGesture, DragReport, DragTarget, GestureFidelity, HeldDrag};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumLauncher};
pub use capture::{Artifact, ArtifactStore, CaptureScope};
pub use config::{HarnessConfig, SessionConfig};
pub use driver::{ElementSnapshot, MockDriver, PageDriver, StyleQuery};
pub use harness::{DriverLauncher, MockLauncher, Scenario, ScenarioReport, ScenarioRunner, SuiteReport};
pub use locator::{BoundingBox, Locator, Point, Selector};
pub use result::{HarnessError, HarnessResult};
pub use session::{AssertionOutcome, ScenarioState, Session, SessionRecord};
pub use wait::{Condition, WaitOptions, WaitResult};

/// Prelude for writing scenarios
pub mod prelude {
    pub use crate::action::{DragGesture, DragTarget};
    pub use crate::capture::CaptureScope;
    pub use crate::driver::{PageDriver, StyleQuery};
    pub use crate::harness::Scenario;
    pub use crate::locator::Locator;
    pub use crate::result::{HarnessError, HarnessResult};
    pub use crate::session::Session;
    pub use crate::wait::Condition;
}
