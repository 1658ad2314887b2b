//! State Driver: actionability waits, pointer actions and drag gestures.
//!
//! Every targeted action resolves its locator at call time and waits until
//! the target is actionable: exactly one match, visible, enabled, not covered
//! at its centre by another element, and with a bounding box that did not
//! move between two consecutive polls.

use crate::driver::{PageDriver, PointerEvent};
use crate::locator::{BoundingBox, Locator, Point};
use crate::result::{HarnessError, HarnessResult};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default auto-wait for actions (10 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 10_000;

/// Boxes closer than this (CSS px) count as stable
const STABLE_EPSILON: f64 = 0.5;

/// Auto-wait settings for actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOptions {
    /// How long to wait for the target to become actionable
    pub timeout: Duration,
    /// Delay between actionability checks
    pub poll_interval: Duration,
}

impl Default for ActionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
            poll_interval: Duration::from_millis(crate::wait::DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl ActionOptions {
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
}

/// A target that passed the actionability checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actionable {
    /// Stable bounding box
    pub bbox: BoundingBox,
}

impl Actionable {
    /// Centre of the target
    #[must_use]
    pub fn center(&self) -> Point {
        self.bbox.center()
    }
}

fn same_box(a: &BoundingBox, b: &BoundingBox) -> bool {
    (a.x - b.x).abs() < STABLE_EPSILON
        && (a.y - b.y).abs() < STABLE_EPSILON
        && (a.width - b.width).abs() < STABLE_EPSILON
        && (a.height - b.height).abs() < STABLE_EPSILON
}

/// Wait until `locator` is actionable
///
/// # Errors
///
/// - `AmbiguousMatch` as soon as a strict locator matches several elements
/// - `ElementNotFound` when nothing matched at the deadline
/// - `ElementNotActionable` when the match stayed hidden, disabled, obscured
///   or moving
pub async fn wait_actionable<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
    options: &ActionOptions,
) -> HarnessResult<Actionable> {
    let timeout = locator.timeout_or(options.timeout);
    let deadline = Instant::now() + timeout;
    let mut previous: Option<BoundingBox> = None;
    let mut reason: Option<&'static str> = None;

    loop {
        let elements = driver.query(locator.selector()).await?;
        if locator.is_strict() && elements.len() > 1 {
            return Err(HarnessError::AmbiguousMatch {
                selector: locator.to_string(),
                count: elements.len(),
            });
        }

        match elements.first() {
            None => {
                previous = None;
                reason = None;
            }
            Some(el) => match el.bbox.filter(|_| el.visible) {
                None => {
                    previous = None;
                    reason = Some("not visible");
                }
                Some(_) if !el.enabled => {
                    previous = None;
                    reason = Some("disabled");
                }
                Some(bbox) => {
                    let stable = previous.is_some_and(|p| same_box(&p, &bbox));
                    if stable && el.receives_pointer {
                        return Ok(Actionable { bbox });
                    }
                    reason = Some(if !el.receives_pointer {
                        "obscured"
                    } else if previous.is_some() {
                        "moving"
                    } else {
                        "not yet stable"
                    });
                    previous = Some(bbox);
                }
            },
        }

        let now = Instant::now();
        if now >= deadline {
            break;
        }
        tokio::time::sleep(options.poll_interval.min(deadline - now)).await;
    }

    Err(match reason {
        None => HarnessError::ElementNotFound {
            selector: locator.to_string(),
        },
        Some(reason) => HarnessError::ElementNotActionable {
            selector: locator.to_string(),
            reason: reason.to_string(),
        },
    })
}

/// Click the centre of `locator`: move, press, release
pub async fn click<D: PageDriver + ?Sized>(
    driver: &mut D,
    locator: &Locator,
    options: &ActionOptions,
) -> HarnessResult<Point> {
    let target = wait_actionable(&*driver, locator, options).await?;
    let at = target.center();
    driver.pointer(PointerEvent::Move(at)).await?;
    driver.pointer(PointerEvent::Down(at)).await?;
    driver.pointer(PointerEvent::Up(at)).await?;
    debug!(target: "tripwire::action", locator = %locator, x = at.x, y = at.y, "click");
    Ok(at)
}

/// Move the pointer over the centre of `locator`
pub async fn hover<D: PageDriver + ?Sized>(
    driver: &mut D,
    locator: &Locator,
    options: &ActionOptions,
) -> HarnessResult<Point> {
    let target = wait_actionable(&*driver, locator, options).await?;
    let at = target.center();
    driver.pointer(PointerEvent::Move(at)).await?;
    debug!(target: "tripwire::action", locator = %locator, "hover");
    Ok(at)
}

/// Replace the content of an input through the browser's input pipeline
pub async fn fill<D: PageDriver + ?Sized>(
    driver: &mut D,
    locator: &Locator,
    text: &str,
    options: &ActionOptions,
) -> HarnessResult<()> {
    wait_actionable(&*driver, locator, options).await?;
    driver.insert_text(locator.selector(), 0, text).await?;
    debug!(target: "tripwire::action", locator = %locator, len = text.len(), "fill");
    Ok(())
}

/// Scroll the single match of `locator` into view; it only needs to be attached
pub async fn scroll_into_view<D: PageDriver + ?Sized>(
    driver: &mut D,
    locator: &Locator,
    options: &ActionOptions,
) -> HarnessResult<()> {
    let deadline = Instant::now() + locator.timeout_or(options.timeout);
    loop {
        let count = driver.query(locator.selector()).await?.len();
        if locator.is_strict() && count > 1 {
            return Err(HarnessError::AmbiguousMatch {
                selector: locator.to_string(),
                count,
            });
        }
        if count > 0 {
            break;
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(HarnessError::ElementNotFound {
                selector: locator.to_string(),
            });
        }
        tokio::time::sleep(options.poll_interval.min(deadline - now)).await;
    }
    driver.scroll_into_view(locator.selector(), 0).await?;
    debug!(target: "tripwire::action", locator = %locator, "scroll into view");
    Ok(())
}

/// Mouse-wheel scroll at `at` (usually the viewport centre)
pub async fn scroll_by<D: PageDriver + ?Sized>(
    driver: &mut D,
    at: Point,
    delta_x: f64,
    delta_y: f64,
) -> HarnessResult<()> {
    driver
        .pointer(PointerEvent::Wheel {
            at,
            delta_x,
            delta_y,
        })
        .await?;
    debug!(target: "tripwire::action", delta_x, delta_y, "wheel");
    Ok(())
}

// =============================================================================
// DRAG GESTURES
// =============================================================================

/// Where a drag ends
#[derive(Debug, Clone, PartialEq)]
pub enum DragTarget {
    /// Centre of a located element
    Center(Locator),
    /// Offset from a located element's top-left corner
    Offset(Locator, f64, f64),
    /// Horizontally centred, this far below the element's top edge
    Inset(Locator, f64),
    /// Absolute viewport point
    Point(Point),
}

impl fmt::Display for DragTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Center(l) => write!(f, "{l}"),
            Self::Offset(l, dx, dy) => write!(f, "{l} +({dx}, {dy})"),
            Self::Inset(l, dy) => write!(f, "{l} +(centre, {dy})"),
            Self::Point(p) => write!(f, "({}, {})", p.x, p.y),
        }
    }
}

/// How faithfully a drag imitated a human pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureFidelity {
    /// Linear path of intermediate moves
    Incremental {
        /// Number of pointer moves after the press
        steps: u32,
    },
    /// Single jump from source to target
    Teleport,
}

impl fmt::Display for GestureFidelity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incremental { steps } => write!(f, "incremental, {steps} steps"),
            Self::Teleport => write!(f, "teleport"),
        }
    }
}

/// Pointer positions visited after the press, ending exactly at `to`
///
/// `steps == 0` yields a single jump.
#[must_use]
pub fn drag_path(from: Point, to: Point, steps: u32) -> Vec<Point> {
    if steps == 0 {
        return vec![to];
    }
    (1..=steps)
        .map(|i| {
            if i == steps {
                to
            } else {
                from.lerp(&to, f64::from(i) / f64::from(steps))
            }
        })
        .collect()
}

/// A press-move-release gesture
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    /// Element grabbed at its centre
    pub source: Locator,
    /// Where the pointer is released
    pub target: DragTarget,
    /// Intermediate moves (0 = teleport)
    pub steps: u32,
    /// Pause after the press, for press-delay sensors
    pub hold: Duration,
    /// Pause after each move
    pub step_delay: Duration,
    /// Pause at the target before release
    pub settle: Duration,
}

impl DragGesture {
    /// Incremental drag with 20 steps and no pauses
    #[must_use]
    pub fn new(source: Locator, target: DragTarget) -> Self {
        Self {
            source,
            target,
            steps: 20,
            hold: Duration::ZERO,
            step_delay: Duration::from_millis(10),
            settle: Duration::ZERO,
        }
    }

    /// Set the number of intermediate moves
    #[must_use]
    pub const fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// Jump straight to the target
    #[must_use]
    pub const fn teleport(mut self) -> Self {
        self.steps = 0;
        self
    }

    /// Hold after the press
    #[must_use]
    pub const fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    /// Pause after each move
    #[must_use]
    pub const fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Pause at the target before release
    #[must_use]
    pub const fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Fidelity implied by the step count
    #[must_use]
    pub const fn fidelity(&self) -> GestureFidelity {
        if self.steps == 0 {
            GestureFidelity::Teleport
        } else {
            GestureFidelity::Incremental { steps: self.steps }
        }
    }

    async fn resolve_target<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        options: &ActionOptions,
    ) -> HarnessResult<Point> {
        match &self.target {
            DragTarget::Point(p) => Ok(*p),
            DragTarget::Center(l) => Ok(wait_actionable(&*driver, l, options).await?.center()),
            DragTarget::Offset(l, dx, dy) => {
                Ok(wait_actionable(&*driver, l, options).await?.bbox.offset(*dx, *dy))
            }
            DragTarget::Inset(l, dy) => {
                let bbox = wait_actionable(&*driver, l, options).await?.bbox;
                Ok(bbox.offset(bbox.width / 2.0, *dy))
            }
        }
    }

    /// Press on the source and move to the target, leaving the button held
    pub async fn begin<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        options: &ActionOptions,
    ) -> HarnessResult<HeldDrag> {
        let from = wait_actionable(&*driver, &self.source, options).await?.center();
        let to = self.resolve_target(driver, options).await?;

        driver.pointer(PointerEvent::Move(from)).await?;
        driver.pointer(PointerEvent::Down(from)).await?;
        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }

        let path = drag_path(from, to, self.steps);
        for point in &path {
            driver.pointer(PointerEvent::Move(*point)).await?;
            if !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }
        }

        debug!(
            target: "tripwire::action",
            source = %self.source,
            target = %self.target,
            fidelity = %self.fidelity(),
            "drag pressed"
        );
        Ok(HeldDrag {
            from,
            to,
            moves: path.len(),
            fidelity: self.fidelity(),
            settle: self.settle,
        })
    }

    /// Full gesture: press, move, settle, release
    pub async fn perform<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        options: &ActionOptions,
    ) -> HarnessResult<DragReport> {
        self.begin(driver, options).await?.release(driver).await
    }
}

/// A drag whose button is still down
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a held drag keeps the pointer pressed until released"]
pub struct HeldDrag {
    from: Point,
    to: Point,
    moves: usize,
    fidelity: GestureFidelity,
    settle: Duration,
}

impl HeldDrag {
    /// Where the pointer currently is
    #[must_use]
    pub const fn position(&self) -> Point {
        self.to
    }

    /// Settle, then release the button at the target
    pub async fn release<D: PageDriver + ?Sized>(self, driver: &mut D) -> HarnessResult<DragReport> {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
        driver.pointer(PointerEvent::Up(self.to)).await?;
        debug!(target: "tripwire::action", fidelity = %self.fidelity, "drag released");
        Ok(DragReport {
            from: self.from,
            to: self.to,
            moves: self.moves,
            fidelity: self.fidelity,
        })
    }
}

/// What a completed drag did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragReport {
    /// Press position
    pub from: Point,
    /// Release position
    pub to: Point,
    /// Pointer moves between press and release
    pub moves: usize,
    /// Gesture fidelity
    pub fidelity: GestureFidelity,
}

impl DragReport {
    /// Turn a failed relocation check into a fidelity error for teleports
    #[must_use]
    pub fn classify_failure(&self, err: HarnessError) -> HarnessError {
        match (self.fidelity, err) {
            (GestureFidelity::Teleport, HarnessError::Timeout { description, .. }) => {
                HarnessError::GestureFidelity {
                    fidelity: self.fidelity.to_string(),
                    message: format!(
                        "{description} never held; a single-jump drag is not recognised by pointer drag sensors"
                    ),
                }
            }
            (_, err) => err,
        }
    }
}
