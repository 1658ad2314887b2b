//! Scenario session: one page, one state machine, one artifact store.
//!
//! ```text
//! Init ──open──► Navigated ──► Driving ⇄ Probing ⇄ Captured
//!   │                │            │         │          │
//!   └────────────────┴────────────┴────┬────┴──────────┘
//!                                      ▼
//!                                   Closed
//! ```

use crate::action::{self, DragGesture, DragReport, HeldDrag};
use crate::capture::{Artifact, ArtifactStore, CaptureScope};
use crate::config::SessionConfig;
use crate::driver::{PageDriver, StyleQuery};
use crate::locator::{Locator, Point};
use crate::result::{HarnessError, HarnessResult};
use crate::wait::{self, Condition, WaitResult};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Lifecycle state of a scenario run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioState {
    /// Browser up, nothing loaded
    Init,
    /// Target page loaded and ready
    Navigated,
    /// Last operation was an action
    Driving,
    /// Last operation was a probe
    Probing,
    /// Last operation was a capture
    Captured,
    /// Session released
    Closed,
}

impl ScenarioState {
    /// Whether moving to `to` is allowed
    #[must_use]
    pub const fn can_transition(self, to: Self) -> bool {
        match (self, to) {
            (Self::Closed, _) => false,
            (_, Self::Closed) => true,
            (Self::Init, Self::Navigated) => true,
            (Self::Init, _) | (_, Self::Init | Self::Navigated) => false,
            _ => true,
        }
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Navigated => "navigated",
            Self::Driving => "driving",
            Self::Probing => "probing",
            Self::Captured => "captured",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Result of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionOutcome {
    /// What was checked
    pub description: String,
    /// Whether it held in time
    pub passed: bool,
    /// Time spent probing
    pub elapsed: Duration,
    /// Configured timeout
    pub timeout: Duration,
    /// Failure details
    pub message: Option<String>,
}

/// A live scenario session over a [`PageDriver`]
#[derive(Debug)]
pub struct Session<D: PageDriver> {
    name: String,
    driver: D,
    config: SessionConfig,
    state: ScenarioState,
    transitions: Vec<(ScenarioState, ScenarioState)>,
    outcomes: Vec<AssertionOutcome>,
    store: ArtifactStore,
    skipped: Vec<String>,
    step: String,
}

impl<D: PageDriver> Session<D> {
    /// Wrap a freshly launched driver
    pub fn new(name: impl Into<String>, driver: D, config: SessionConfig) -> Self {
        let name = name.into();
        let store = ArtifactStore::new(&config.artifact_dir, &name);
        Self {
            name,
            driver,
            config,
            state: ScenarioState::Init,
            transitions: Vec::new(),
            outcomes: Vec::new(),
            store,
            skipped: Vec::new(),
            step: String::from("start"),
        }
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> ScenarioState {
        self.state
    }

    /// Every state change so far
    #[must_use]
    pub fn transitions(&self) -> &[(ScenarioState, ScenarioState)] {
        &self.transitions
    }

    /// Probe results so far
    #[must_use]
    pub fn outcomes(&self) -> &[AssertionOutcome] {
        &self.outcomes
    }

    /// Screenshots written so far
    #[must_use]
    pub fn artifacts(&self) -> &[Artifact] {
        self.store.artifacts()
    }

    /// Checkpoints whose capture was skipped
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Session settings
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Underlying driver
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    fn transition(&mut self, to: ScenarioState) -> HarnessResult<()> {
        if self.state == to {
            return Ok(());
        }
        if !self.state.can_transition(to) {
            return Err(HarnessError::invalid_state(format!(
                "{}: cannot go from {} to {to}",
                self.name, self.state
            )));
        }
        self.transitions.push((self.state, to));
        self.state = to;
        Ok(())
    }

    fn ensure_open(&self, operation: &str) -> HarnessResult<()> {
        match self.state {
            ScenarioState::Init => Err(HarnessError::invalid_state(format!(
                "{operation} before navigation"
            ))),
            ScenarioState::Closed => Err(HarnessError::invalid_state(format!(
                "{operation} after the session was closed"
            ))),
            _ => Ok(()),
        }
    }

    fn begin_action(&mut self, step: String) -> HarnessResult<()> {
        self.ensure_open(&step)?;
        self.transition(ScenarioState::Driving)?;
        self.step = step;
        Ok(())
    }

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    /// Navigate, wait for the document, then for `anchor` if given
    ///
    /// # Errors
    ///
    /// `Navigation` when the URL cannot be loaded or the document never
    /// becomes ready, `ElementNotFound` when the anchor never shows.
    pub async fn open(&mut self, url: &str, anchor: Option<&Locator>) -> HarnessResult<()> {
        if self.state != ScenarioState::Init {
            return Err(HarnessError::invalid_state(format!(
                "open called in state {}",
                self.state
            )));
        }
        let timeout = self.config.navigation_timeout;
        info!(target: "tripwire::session", scenario = %self.name, url, "navigating");
        self.driver.navigate(url, timeout).await?;

        let ready = self.config.wait.with_timeout(timeout);
        wait::probe(&self.driver, &Condition::DocumentReady, &ready)
            .await
            .map_err(|e| HarnessError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        self.transition(ScenarioState::Navigated)?;
        self.step = format!("open {url}");

        if let Some(anchor) = anchor {
            let options = ready.with_timeout(anchor.timeout_or(timeout));
            wait::probe(&self.driver, &Condition::Visible(anchor.clone()), &options)
                .await
                .map_err(|e| match e {
                    HarnessError::Timeout { .. } => HarnessError::ElementNotFound {
                        selector: anchor.to_string(),
                    },
                    other => other,
                })?;
        }
        Ok(())
    }

    // =========================================================================
    // STATE DRIVER
    // =========================================================================

    /// Click the centre of a single actionable element
    pub async fn click(&mut self, locator: &Locator) -> HarnessResult<Point> {
        self.begin_action(format!("click {locator}"))?;
        action::click(&mut self.driver, locator, &self.config.action).await
    }

    /// Replace an input's content
    pub async fn fill(&mut self, locator: &Locator, text: &str) -> HarnessResult<()> {
        self.begin_action(format!("fill {locator}"))?;
        action::fill(&mut self.driver, locator, text, &self.config.action).await
    }

    /// Move the pointer over an element
    pub async fn hover(&mut self, locator: &Locator) -> HarnessResult<Point> {
        self.begin_action(format!("hover {locator}"))?;
        action::hover(&mut self.driver, locator, &self.config.action).await
    }

    /// Wheel-scroll at the viewport centre
    pub async fn scroll_by(&mut self, delta_x: f64, delta_y: f64) -> HarnessResult<()> {
        self.begin_action(format!("scroll by ({delta_x}, {delta_y})"))?;
        let (w, h) = self.config.viewport;
        let center = Point::new(f64::from(w) / 2.0, f64::from(h) / 2.0);
        action::scroll_by(&mut self.driver, center, delta_x, delta_y).await
    }

    /// Scroll an element into view
    pub async fn scroll_into_view(&mut self, locator: &Locator) -> HarnessResult<()> {
        self.begin_action(format!("scroll {locator} into view"))?;
        action::scroll_into_view(&mut self.driver, locator, &self.config.action).await
    }

    /// Fixed sleep, for animations nothing observable signals the end of
    pub async fn pause(&mut self, duration: Duration) -> HarnessResult<()> {
        self.begin_action(format!("pause {}ms", duration.as_millis()))?;
        tokio::time::sleep(duration).await;
        Ok(())
    }

    /// Run a full drag gesture
    pub async fn drag(&mut self, gesture: &DragGesture) -> HarnessResult<DragReport> {
        self.begin_action(format!("drag {} to {}", gesture.source, gesture.target))?;
        gesture.perform(&mut self.driver, &self.config.action).await
    }

    /// Press and move, keeping the button held for mid-gesture checks
    pub async fn drag_hold(&mut self, gesture: &DragGesture) -> HarnessResult<HeldDrag> {
        self.begin_action(format!("drag {} over {}", gesture.source, gesture.target))?;
        gesture.begin(&mut self.driver, &self.config.action).await
    }

    /// Release a held drag
    pub async fn drag_release(&mut self, held: HeldDrag) -> HarnessResult<DragReport> {
        self.begin_action("release drag".to_string())?;
        held.release(&mut self.driver).await
    }

    // =========================================================================
    // CONDITION PROBER
    // =========================================================================

    async fn run_probe(
        &mut self,
        condition: &Condition,
        options: wait::WaitOptions,
    ) -> HarnessResult<WaitResult> {
        self.ensure_open("probe")?;
        self.transition(ScenarioState::Probing)?;
        let timeout = condition.timeout_or(options.timeout);
        let start = Instant::now();
        let result = wait::probe(&self.driver, condition, &options).await;
        self.outcomes.push(AssertionOutcome {
            description: condition.to_string(),
            passed: result.is_ok(),
            elapsed: start.elapsed(),
            timeout,
            message: result.as_ref().err().map(ToString::to_string),
        });
        result
    }

    /// Wait for a condition with the session probe timeout
    pub async fn expect(&mut self, condition: Condition) -> HarnessResult<WaitResult> {
        let options = self.config.wait;
        self.run_probe(&condition, options).await
    }

    /// Wait for a condition with an explicit timeout
    pub async fn expect_within(
        &mut self,
        condition: Condition,
        timeout: Duration,
    ) -> HarnessResult<WaitResult> {
        let options = self.config.wait.with_timeout(timeout);
        self.run_probe(&condition, options).await
    }

    /// Probe without failing the scenario on timeout; logs a warning instead
    pub async fn check(&mut self, condition: Condition) -> HarnessResult<bool> {
        let options = self.config.wait;
        match self.run_probe(&condition, options).await {
            Ok(_) => Ok(true),
            Err(HarnessError::Timeout { last_observed, .. }) => {
                warn!(
                    target: "tripwire::session",
                    scenario = %self.name,
                    "check failed: {condition} (last observed: {last_observed})"
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Confirm a drag moved something; timeouts after a teleport become
    /// `GestureFidelity` errors
    pub async fn expect_relocated(
        &mut self,
        report: &DragReport,
        condition: Condition,
    ) -> HarnessResult<WaitResult> {
        self.expect(condition)
            .await
            .map_err(|e| report.classify_failure(e))
    }

    /// Read a style value once
    pub async fn style_value(&self, query: &StyleQuery) -> HarnessResult<Option<String>> {
        self.ensure_open("style read")?;
        self.driver.style_value(query).await
    }

    /// Evaluate a script once
    pub async fn evaluate(&self, script: &str) -> HarnessResult<serde_json::Value> {
        self.ensure_open("evaluate")?;
        self.driver.evaluate(script).await
    }

    // =========================================================================
    // EVIDENCE CAPTURE
    // =========================================================================

    /// Write a screenshot; element misses return `CaptureSkipped`
    pub async fn capture(
        &mut self,
        checkpoint: &str,
        scope: CaptureScope,
    ) -> HarnessResult<Artifact> {
        self.ensure_open("capture")?;
        self.transition(ScenarioState::Captured)?;
        self.store
            .capture(&mut self.driver, checkpoint, &scope, &self.step)
            .await
    }

    /// Full-page capture after an error, in any state but `Closed`
    ///
    /// A failed `open` still leaves a page behind, so this also works
    /// before navigation; the state only moves once the page is loaded.
    pub async fn capture_failure(&mut self) -> HarnessResult<Artifact> {
        if self.state == ScenarioState::Closed {
            return Err(HarnessError::invalid_state(
                "failure capture after the session was closed",
            ));
        }
        if self.state != ScenarioState::Init {
            self.transition(ScenarioState::Captured)?;
        }
        self.store
            .capture(&mut self.driver, "failure", &CaptureScope::FullPage, &self.step)
            .await
    }

    /// Capture, tolerating a skip so later checks still run
    pub async fn checkpoint(
        &mut self,
        checkpoint: &str,
        scope: CaptureScope,
    ) -> HarnessResult<Option<Artifact>> {
        match self.capture(checkpoint, scope).await {
            Ok(artifact) => Ok(Some(artifact)),
            Err(HarnessError::CaptureSkipped { checkpoint, reason }) => {
                warn!(
                    target: "tripwire::capture",
                    scenario = %self.name,
                    "capture '{checkpoint}' skipped: {reason}"
                );
                self.skipped.push(checkpoint);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // TEARDOWN
    // =========================================================================

    /// Release the page; the driver is closed exactly once
    pub async fn close(&mut self) -> HarnessResult<()> {
        if self.state == ScenarioState::Closed {
            return Ok(());
        }
        self.transition(ScenarioState::Closed)?;
        info!(target: "tripwire::session", scenario = %self.name, "closing");
        self.driver.close().await
    }

    /// Tear the session into its records
    #[must_use]
    pub fn into_record(self) -> SessionRecord {
        SessionRecord {
            outcomes: self.outcomes,
            artifacts: self.store.into_artifacts(),
            skipped: self.skipped,
            transitions: self.transitions,
        }
    }
}

/// What a finished session leaves behind
#[derive(Debug, Clone, Default)]
pub struct SessionRecord {
    /// Probe results
    pub outcomes: Vec<AssertionOutcome>,
    /// Written screenshots
    pub artifacts: Vec<Artifact>,
    /// Skipped checkpoints
    pub skipped: Vec<String>,
    /// State changes
    pub transitions: Vec<(ScenarioState, ScenarioState)>,
}
