//! Scenario harness: launch, open, run, capture on failure, always close.

use crate::browser::BrowserConfig;
use crate::config::HarnessConfig;
use crate::driver::{MockDriver, PageDriver};
use crate::locator::Locator;
use crate::result::{HarnessError, HarnessResult};
use crate::session::{Session, SessionRecord};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Starts one fresh browser page per scenario
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    /// Driver produced by this launcher
    type Driver: PageDriver;

    /// Launch a browser with `config`
    async fn launch(&self, config: &BrowserConfig) -> HarnessResult<Self::Driver>;
}

/// One end-to-end check against the app
#[async_trait]
pub trait Scenario<D: PageDriver>: Send + Sync {
    /// Stable identifier used on the command line and in artifact paths
    fn name(&self) -> &'static str;

    /// One-line summary
    fn description(&self) -> &'static str;

    /// Path joined onto the base URL
    fn entry_path(&self) -> &'static str {
        "/"
    }

    /// Viewport this scenario needs, if not the configured one
    fn viewport(&self) -> Option<(u32, u32)> {
        None
    }

    /// User agent this scenario needs when none is configured
    fn user_agent(&self) -> Option<&'static str> {
        None
    }

    /// Element that must be visible before the scenario starts
    fn anchor(&self) -> Option<Locator> {
        None
    }

    /// Drive the page and probe the outcome
    async fn run(&self, session: &mut Session<D>) -> HarnessResult<()>;
}

/// Outcome of a single scenario
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error variant if failed
    pub error_kind: Option<String>,
    /// Error message if failed
    pub error: Option<String>,
    /// Wall-clock duration
    pub duration: Duration,
    /// Probes, artifacts and transitions
    pub record: SessionRecord,
}

impl ScenarioReport {
    /// Create a passing report
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error_kind: None,
            error: None,
            duration: Duration::ZERO,
            record: SessionRecord::default(),
        }
    }

    /// Create a failing report
    #[must_use]
    pub fn fail(name: impl Into<String>, error: &HarnessError) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error_kind: Some(error.kind().to_string()),
            error: Some(error.to_string()),
            duration: Duration::ZERO,
            record: SessionRecord::default(),
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Attach the session record
    #[must_use]
    pub fn with_record(mut self, record: SessionRecord) -> Self {
        self.record = record;
        self
    }

    /// Soft checks that did not hold
    #[must_use]
    pub fn warnings(&self) -> usize {
        if self.passed {
            self.record.outcomes.iter().filter(|o| !o.passed).count()
        } else {
            0
        }
    }
}

/// Results from running several scenarios
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    /// Individual scenario reports
    pub results: Vec<ScenarioReport>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteReport {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Count written screenshots
    #[must_use]
    pub fn artifact_count(&self) -> usize {
        self.results.iter().map(|r| r.record.artifacts.len()).sum()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

/// Runs scenarios one at a time, each in a fresh browser
#[derive(Debug)]
pub struct ScenarioRunner<L: DriverLauncher> {
    launcher: L,
    config: HarnessConfig,
}

impl<L: DriverLauncher> ScenarioRunner<L> {
    /// Create a runner
    pub const fn new(launcher: L, config: HarnessConfig) -> Self {
        Self { launcher, config }
    }

    /// Effective configuration
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Browser settings for `scenario`: its viewport wins, its user agent
    /// only fills a gap
    pub fn browser_config(&self, scenario: &dyn Scenario<L::Driver>) -> BrowserConfig {
        let mut browser = self.config.browser.clone();
        if let Some((w, h)) = scenario.viewport() {
            browser = browser.with_viewport(w, h);
        }
        if browser.user_agent.is_none() {
            if let Some(ua) = scenario.user_agent() {
                browser = browser.with_user_agent(ua);
            }
        }
        browser
    }

    /// Run one scenario; the session is closed on every path
    pub async fn run(&self, scenario: &dyn Scenario<L::Driver>) -> ScenarioReport {
        let start = Instant::now();
        let name = scenario.name();
        let browser = self.browser_config(scenario);

        let driver = match self.launcher.launch(&browser).await {
            Ok(driver) => driver,
            Err(e) => {
                warn!(target: "tripwire::runner", scenario = name, "launch failed: {e}");
                return ScenarioReport::fail(name, &e).with_duration(start.elapsed());
            }
        };

        let mut session = Session::new(name, driver, self.config.session_config(&browser));
        let url = self.config.url_for(scenario.entry_path());
        let anchor = scenario.anchor();

        let mut result = match session.open(&url, anchor.as_ref()).await {
            Ok(()) => scenario.run(&mut session).await,
            Err(e) => Err(e),
        };

        if let Err(ref e) = result {
            warn!(target: "tripwire::runner", scenario = name, kind = e.kind(), "{e}");
            if let Err(capture_err) = session.capture_failure().await {
                warn!(
                    target: "tripwire::runner",
                    scenario = name,
                    "failure capture failed: {capture_err}"
                );
            }
        }

        if let Err(close_err) = session.close().await {
            warn!(target: "tripwire::runner", scenario = name, "close failed: {close_err}");
            if result.is_ok() {
                result = Err(close_err);
            }
        }

        let duration = start.elapsed();
        let report = match result {
            Ok(()) => ScenarioReport::pass(name),
            Err(e) => ScenarioReport::fail(name, &e),
        };
        info!(
            target: "tripwire::runner",
            scenario = name,
            passed = report.passed,
            duration_ms = duration.as_millis() as u64,
            "scenario finished"
        );
        report
            .with_duration(duration)
            .with_record(session.into_record())
    }
}

/// Launcher handing out one shared [`MockDriver`], for tests
#[derive(Debug, Clone, Default)]
pub struct MockLauncher {
    driver: MockDriver,
    failure: Option<String>,
    launches: Arc<AtomicUsize>,
    configs: Arc<Mutex<Vec<BrowserConfig>>>,
}

impl MockLauncher {
    /// Launch clones of `driver`
    #[must_use]
    pub fn new(driver: MockDriver) -> Self {
        Self {
            driver,
            ..Self::default()
        }
    }

    /// Fail every launch
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of launches so far
    #[must_use]
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Browser configs passed to each launch
    #[must_use]
    pub fn configs(&self) -> Vec<BrowserConfig> {
        self.configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DriverLauncher for MockLauncher {
    type Driver = MockDriver;

    async fn launch(&self, config: &BrowserConfig) -> HarnessResult<MockDriver> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(config.clone());
        match &self.failure {
            Some(message) => Err(HarnessError::BrowserLaunch {
                message: message.clone(),
            }),
            None => Ok(self.driver.clone().with_viewport(
                config.viewport_width,
                config.viewport_height,
            )),
        }
    }
}
