//! Condition Prober
//!
//! Bounded polling for DOM and style conditions. A probe succeeds on the
//! first observation that holds (negative conditions must keep holding for
//! the settle window) and otherwise fails with [`HarnessError::Timeout`]
//! carrying the last value it saw.
//!
//! ```text
//!   observe ──► holds? ──yes──► negative? ──no──► success
//!      ▲          │                │
//!      │          no               yes: held for settle? ──yes──► success
//!      │          │                │
//!      └─ sleep ◄─┴── deadline? ───┴──► Timeout { last_observed }
//! ```

use crate::driver::{ElementSnapshot, PageDriver, StyleQuery};
use crate::locator::Locator;
use crate::result::{HarnessError, HarnessResult};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for probes (5 seconds)
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default settle window for negative conditions (300ms)
pub const DEFAULT_SETTLE_MS: u64 = 300;

const READY_STATES: [&str; 2] = ["interactive", "complete"];

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for probe operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Deadline for the condition to start holding
    pub timeout: Duration,
    /// Delay between observations
    pub poll_interval: Duration,
    /// How long a negative condition must hold continuously
    pub settle: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set settle window
    #[must_use]
    pub const fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

// =============================================================================
// CONDITIONS
// =============================================================================

/// A DOM or style condition to probe for
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// At least one match in the DOM
    Attached(Locator),
    /// No match in the DOM
    Detached(Locator),
    /// The match is rendered with a non-empty box
    Visible(Locator),
    /// No visible match
    Hidden(Locator),
    /// Trimmed text equals the value
    TextEquals(Locator, String),
    /// Text contains the value
    TextContains(Locator, String),
    /// No match contains the value
    TextAbsent(Locator, String),
    /// The match carries the class
    HasClass(Locator, String),
    /// The match exists and does not carry the class
    LacksClass(Locator, String),
    /// Exact number of matches
    Count(Locator, usize),
    /// Style value equals
    StyleEquals(StyleQuery, String),
    /// Style value contains
    StyleContains(StyleQuery, String),
    /// Style value is set to anything non-empty
    StyleNotEmpty(StyleQuery),
    /// `document.readyState` is `interactive` or `complete`
    DocumentReady,
}

/// One observation of a condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Whether the condition held
    pub holds: bool,
    /// What was seen, for timeout diagnostics
    pub observed: String,
}

impl Observation {
    fn new(holds: bool, observed: impl Into<String>) -> Self {
        Self {
            holds,
            observed: observed.into(),
        }
    }
}

fn summarize(elements: &[ElementSnapshot]) -> String {
    match elements {
        [] => "0 matches".to_string(),
        [el] => format!(
            "1 match ({}, text {:?}, class {:?})",
            if el.visible { "visible" } else { "hidden" },
            el.text,
            el.class_name
        ),
        many => format!(
            "{} matches ({} visible)",
            many.len(),
            many.iter().filter(|e| e.visible).count()
        ),
    }
}

impl Condition {
    /// Conditions that assert something is gone; these must settle
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        matches!(
            self,
            Self::Detached(_) | Self::Hidden(_) | Self::TextAbsent(..) | Self::LacksClass(..)
        )
    }

    /// The locator this condition resolves, if any
    #[must_use]
    pub const fn locator(&self) -> Option<&Locator> {
        match self {
            Self::Attached(l)
            | Self::Detached(l)
            | Self::Visible(l)
            | Self::Hidden(l)
            | Self::TextEquals(l, _)
            | Self::TextContains(l, _)
            | Self::TextAbsent(l, _)
            | Self::HasClass(l, _)
            | Self::LacksClass(l, _)
            | Self::Count(l, _) => Some(l),
            Self::StyleEquals(..)
            | Self::StyleContains(..)
            | Self::StyleNotEmpty(_)
            | Self::DocumentReady => None,
        }
    }

    /// Probe timeout: the locator override, else the session default
    #[must_use]
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.locator().map_or(default, |l| l.timeout_or(default))
    }

    /// Observe the page once
    ///
    /// # Errors
    ///
    /// `AmbiguousMatch` when a strict locator resolves to several elements
    /// (except for [`Condition::Count`]), or any driver error.
    pub async fn observe<D: PageDriver + ?Sized>(&self, driver: &D) -> HarnessResult<Observation> {
        if let Some(locator) = self.locator() {
            let elements = driver.query(locator.selector()).await?;
            if locator.is_strict() && elements.len() > 1 && !matches!(self, Self::Count(..)) {
                return Err(HarnessError::AmbiguousMatch {
                    selector: locator.to_string(),
                    count: elements.len(),
                });
            }
            return Ok(self.observe_elements(&elements));
        }

        match self {
            Self::StyleEquals(query, expected) => {
                let value = driver.style_value(query).await?;
                Ok(Self::observe_style(value, |v| v == expected))
            }
            Self::StyleContains(query, needle) => {
                let value = driver.style_value(query).await?;
                Ok(Self::observe_style(value, |v| v.contains(needle.as_str())))
            }
            Self::StyleNotEmpty(query) => {
                let value = driver.style_value(query).await?;
                Ok(Self::observe_style(value, |v| !v.trim().is_empty()))
            }
            _ => {
                let state = driver.ready_state().await?;
                Ok(Observation::new(
                    READY_STATES.contains(&state.as_str()),
                    format!("readyState {state:?}"),
                ))
            }
        }
    }

    fn observe_style(value: Option<String>, check: impl Fn(&str) -> bool) -> Observation {
        match value {
            Some(v) => Observation::new(check(&v), format!("{v:?}")),
            None => Observation::new(false, "no element"),
        }
    }

    fn observe_elements(&self, elements: &[ElementSnapshot]) -> Observation {
        let observed = summarize(elements);
        let first = elements.first();
        let holds = match self {
            Self::Attached(_) => !elements.is_empty(),
            Self::Detached(_) => elements.is_empty(),
            Self::Visible(_) => elements.iter().any(|e| e.visible),
            Self::Hidden(_) => elements.iter().all(|e| !e.visible),
            Self::TextEquals(_, text) => first.is_some_and(|e| e.text.trim() == text.trim()),
            Self::TextContains(_, text) => first.is_some_and(|e| e.text.contains(text.as_str())),
            Self::TextAbsent(_, text) => !elements.iter().any(|e| e.text.contains(text.as_str())),
            Self::HasClass(_, class) => first.is_some_and(|e| e.has_class(class)),
            Self::LacksClass(_, class) => first.is_some_and(|e| !e.has_class(class)),
            Self::Count(_, n) => elements.len() == *n,
            _ => false,
        };
        Observation::new(holds, observed)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attached(l) => write!(f, "{l} is attached"),
            Self::Detached(l) => write!(f, "{l} is detached"),
            Self::Visible(l) => write!(f, "{l} is visible"),
            Self::Hidden(l) => write!(f, "{l} is hidden"),
            Self::TextEquals(l, t) => write!(f, "{l} has text {t:?}"),
            Self::TextContains(l, t) => write!(f, "{l} contains text {t:?}"),
            Self::TextAbsent(l, t) => write!(f, "{l} does not contain text {t:?}"),
            Self::HasClass(l, c) => write!(f, "{l} has class {c:?}"),
            Self::LacksClass(l, c) => write!(f, "{l} lacks class {c:?}"),
            Self::Count(l, n) => write!(f, "{l} has {n} matches"),
            Self::StyleEquals(q, v) => write!(f, "{q} == {v:?}"),
            Self::StyleContains(q, v) => write!(f, "{q} contains {v:?}"),
            Self::StyleNotEmpty(q) => write!(f, "{q} is set"),
            Self::DocumentReady => write!(f, "document is ready"),
        }
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful probe
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
    /// Observation that satisfied the condition
    pub observed: String,
}

// =============================================================================
// PROBE LOOP
// =============================================================================

/// Poll `condition` until it holds or the deadline passes
///
/// A negative condition that starts holding before the deadline may finish
/// its settle window after it.
///
/// # Errors
///
/// `Timeout` with the last observation, `AmbiguousMatch` immediately for
/// ambiguous strict locators, or any driver error.
pub async fn probe<D: PageDriver + ?Sized>(
    driver: &D,
    condition: &Condition,
    options: &WaitOptions,
) -> HarnessResult<WaitResult> {
    let timeout = condition.timeout_or(options.timeout);
    let start = Instant::now();
    let deadline = start + timeout;
    let negative = condition.is_negative();
    let mut holding_since: Option<Instant> = None;
    let mut last_observed = String::from("nothing observed");

    loop {
        let observed_at = Instant::now();
        let observation = condition.observe(driver).await?;
        last_observed = observation.observed;

        if observation.holds {
            let since = *holding_since.get_or_insert(observed_at);
            let settled = !negative || observed_at.duration_since(since) >= options.settle;
            if settled && since < deadline {
                debug!(
                    target: "tripwire::probe",
                    condition = %condition,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "condition holds"
                );
                return Ok(WaitResult {
                    elapsed: start.elapsed(),
                    waited_for: condition.to_string(),
                    observed: last_observed,
                });
            }
        } else {
            holding_since = None;
        }

        let now = Instant::now();
        let settling = negative && holding_since.is_some_and(|s| s < deadline);
        if now >= deadline && !settling {
            break;
        }
        let sleep_for = if now < deadline {
            options.poll_interval.min(deadline - now)
        } else {
            options.poll_interval
        };
        tokio::time::sleep(sleep_for.max(Duration::from_millis(1))).await;
    }

    Err(HarnessError::Timeout {
        description: condition.to_string(),
        timeout_ms: timeout.as_millis() as u64,
        last_observed,
    })
}

// =============================================================================
// TESTS
// =============================================================================
