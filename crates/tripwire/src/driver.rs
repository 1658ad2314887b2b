//! PageDriver - Abstract Browser Automation Trait
//!
//! The harness never talks to a browser library directly. Everything it needs
//! from a page goes through [`PageDriver`], which keeps the session, prober and
//! capture logic independent of the automation backend.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  PageDriver (Abstract Trait)                               │
//! ├───────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────┐   │
//! │  │  ChromiumDriver     │        │  MockDriver         │   │
//! │  │  (feature=browser)  │        │  (unit tests)       │   │
//! │  │  CDP via            │        │  scripted page      │   │
//! │  │  chromiumoxide      │        │  frames + reactions │   │
//! │  └─────────────────────┘        └─────────────────────┘   │
//! └───────────────────────────────────────────────────────────┘
//! ```

use crate::locator::{BoundingBox, Locator, Point, Selector};
use crate::result::{HarnessError, HarnessResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

/// Snapshot of one matched element at query time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Lower-case tag name
    pub tag: String,
    /// Normalised rendered text
    pub text: String,
    /// Raw class attribute
    pub class_name: String,
    /// Non-empty box and not `visibility: hidden` / `display: none`
    pub visible: bool,
    /// Not disabled / aria-disabled
    pub enabled: bool,
    /// A hit test at the centre lands on the element or inside it
    #[serde(default = "receives_pointer_default")]
    pub receives_pointer: bool,
    /// Bounding box if visible
    pub bbox: Option<BoundingBox>,
}

const fn receives_pointer_default() -> bool {
    true
}

impl ElementSnapshot {
    /// Create an attached, invisible element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: String::new(),
            class_name: String::new(),
            visible: false,
            enabled: true,
            receives_pointer: true,
            bbox: None,
        }
    }

    /// Make the element visible at `bbox`
    #[must_use]
    pub fn at(mut self, bbox: BoundingBox) -> Self {
        self.visible = bbox.has_area();
        self.bbox = Some(bbox);
        self
    }

    /// Set the rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the class attribute
    #[must_use]
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Mark the element disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Mark the element as covered by something else at its centre
    #[must_use]
    pub fn obscured(mut self) -> Self {
        self.receives_pointer = false;
        self
    }

    /// Whether the class list contains `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.class_name.split_whitespace().any(|c| c == class)
    }
}

/// Element whose style is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleTarget {
    /// `document.body`
    Body,
    /// First match of a selector
    Element(Selector),
}

/// Inline (`el.style`) or computed style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleSource {
    /// Value set on the element's style attribute
    Inline,
    /// `getComputedStyle` value
    Computed,
}

/// A single style property read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleQuery {
    /// Element to read
    pub target: StyleTarget,
    /// CSS property name (kebab-case)
    pub property: String,
    /// Inline or computed
    pub source: StyleSource,
}

impl StyleQuery {
    /// Inline style of `document.body` (scroll locks live here)
    #[must_use]
    pub fn body_inline(property: impl Into<String>) -> Self {
        Self {
            target: StyleTarget::Body,
            property: property.into(),
            source: StyleSource::Inline,
        }
    }

    /// Computed style of `document.body`
    #[must_use]
    pub fn body_computed(property: impl Into<String>) -> Self {
        Self {
            target: StyleTarget::Body,
            property: property.into(),
            source: StyleSource::Computed,
        }
    }

    /// Computed style of a located element
    #[must_use]
    pub fn computed(locator: &Locator, property: impl Into<String>) -> Self {
        Self {
            target: StyleTarget::Element(locator.selector().clone()),
            property: property.into(),
            source: StyleSource::Computed,
        }
    }

    /// Script evaluating to the value, or `null` when the target is missing
    #[must_use]
    pub fn to_script(&self) -> String {
        let prop = serde_json::to_string(&self.property).unwrap_or_else(|_| "\"\"".to_string());
        let target = match &self.target {
            StyleTarget::Body => "document.body".to_string(),
            StyleTarget::Element(selector) => format!(
                "(() => {{ {}\nreturn ({})[0] || null; }})()",
                crate::locator::JS_PRELUDE,
                selector.to_js("document")
            ),
        };
        let read = match self.source {
            StyleSource::Inline => format!("el.style.getPropertyValue({prop})"),
            StyleSource::Computed => {
                format!("window.getComputedStyle(el).getPropertyValue({prop})")
            }
        };
        format!("(() => {{ const el = {target}; if (!el) return null; return {read}; }})()")
    }
}

impl fmt::Display for StyleQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            StyleSource::Inline => "style",
            StyleSource::Computed => "computed",
        };
        match &self.target {
            StyleTarget::Body => write!(f, "body.{source}.{}", self.property),
            StyleTarget::Element(selector) => write!(f, "({selector}).{source}.{}", self.property),
        }
    }
}

/// Low-level pointer input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Move without buttons pressed, or while dragging
    Move(Point),
    /// Press the primary button
    Down(Point),
    /// Release the primary button
    Up(Point),
    /// Mouse wheel scroll
    Wheel {
        /// Pointer position
        at: Point,
        /// Horizontal delta
        delta_x: f64,
        /// Vertical delta
        delta_y: f64,
    },
}

impl PointerEvent {
    /// Pointer position for this event
    #[must_use]
    pub const fn point(&self) -> Point {
        match self {
            Self::Move(p) | Self::Down(p) | Self::Up(p) => *p,
            Self::Wheel { at, .. } => *at,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Move(_) => "move",
            Self::Down(_) => "down",
            Self::Up(_) => "up",
            Self::Wheel { .. } => "wheel",
        }
    }
}

/// What part of the page a screenshot covers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScreenshotScope {
    /// Whole scrollable page
    FullPage,
    /// Current viewport
    Viewport,
    /// A clip rectangle in viewport coordinates
    Clip(BoundingBox),
}

impl ScreenshotScope {
    /// Clip rectangle in page coordinates for a page scrolled to `scroll`
    #[must_use]
    pub fn page_clip(&self, scroll: Point) -> Option<BoundingBox> {
        match self {
            Self::Clip(bbox) => Some(bbox.translate(scroll.x, scroll.y)),
            Self::FullPage | Self::Viewport => None,
        }
    }
}

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Timestamp when screenshot was taken
    pub timestamp: SystemTime,
}

impl Screenshot {
    /// Decode dimensions from PNG bytes
    pub fn from_png(data: Vec<u8>) -> HarnessResult<Self> {
        let decoded = image::load_from_memory_with_format(&data, image::ImageFormat::Png)?;
        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            data,
            timestamp: SystemTime::now(),
        })
    }
}

/// Abstract driver trait for one browser page
///
/// # Implementations
///
/// - `ChromiumDriver` - chromiumoxide over CDP (feature `browser`)
/// - [`MockDriver`] - scripted page for unit testing
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL, bounded by `timeout`
    async fn navigate(&mut self, url: &str, timeout: Duration) -> HarnessResult<()>;

    /// `document.readyState`
    async fn ready_state(&self) -> HarnessResult<String>;

    /// Resolve a selector against the live DOM
    async fn query(&self, selector: &Selector) -> HarnessResult<Vec<ElementSnapshot>>;

    /// Read a style property; `None` when the target element is missing
    async fn style_value(&self, query: &StyleQuery) -> HarnessResult<Option<String>>;

    /// Evaluate a script in the page
    async fn evaluate(&self, script: &str) -> HarnessResult<serde_json::Value>;

    /// Dispatch pointer input
    async fn pointer(&mut self, event: PointerEvent) -> HarnessResult<()>;

    /// Focus match `index` of `selector`, replace its content with `text`
    async fn insert_text(
        &mut self,
        selector: &Selector,
        index: usize,
        text: &str,
    ) -> HarnessResult<()>;

    /// Scroll match `index` of `selector` into the viewport
    async fn scroll_into_view(&mut self, selector: &Selector, index: usize) -> HarnessResult<()>;

    /// Take a PNG screenshot
    async fn screenshot(&self, scope: ScreenshotScope) -> HarnessResult<Screenshot>;

    /// Close the page and release the browser
    async fn close(&mut self) -> HarnessResult<()>;
}

// ============================================================================
// Mock driver
// ============================================================================

type ClickReaction = Box<dyn FnMut(&mut MockPage) + Send>;
type TraceReaction = Box<dyn FnMut(&PointerTrace, &mut MockPage) + Send>;

/// Scripted values: each observation advances one frame, the last one sticks
#[derive(Debug, Clone, Default)]
struct Track<T: Clone> {
    frames: VecDeque<T>,
    current: T,
}

impl<T: Clone> Track<T> {
    fn fixed(value: T) -> Self {
        Self {
            frames: VecDeque::new(),
            current: value,
        }
    }

    fn scripted(frames: Vec<T>, fallback: T) -> Self {
        Self {
            frames: frames.into(),
            current: fallback,
        }
    }

    fn observe(&mut self) -> T {
        if let Some(next) = self.frames.pop_front() {
            self.current = next;
        }
        self.current.clone()
    }
}

/// Pointer path between a press and its release
#[derive(Debug, Clone, PartialEq)]
pub struct PointerTrace {
    /// Where the button went down
    pub down: Point,
    /// Intermediate moves while pressed
    pub moves: Vec<Point>,
    /// Where the button was released
    pub up: Point,
}

/// Fake page state behind [`MockDriver`]
pub struct MockPage {
    elements: HashMap<String, Track<Vec<ElementSnapshot>>>,
    styles: HashMap<String, Track<Option<String>>>,
    evaluations: HashMap<String, serde_json::Value>,
    ready_state: String,
    navigation_error: Option<String>,
    click_reactions: Vec<(String, ClickReaction)>,
    drag_reactions: Vec<TraceReaction>,
    release_reactions: Vec<TraceReaction>,
    pressed: Option<(Point, Vec<Point>)>,
    viewport: (u32, u32),
    /// Every driver call, e.g. `navigate:http://…`, `pointer:down`
    pub history: Vec<String>,
    /// Every pointer event in order
    pub pointer_log: Vec<PointerEvent>,
    /// `(selector, text)` per fill
    pub typed: Vec<(String, String)>,
    /// Number of `close` calls
    pub close_calls: usize,
}

impl fmt::Debug for MockPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockPage")
            .field("elements", &self.elements.keys().collect::<Vec<_>>())
            .field("history", &self.history)
            .field("close_calls", &self.close_calls)
            .finish_non_exhaustive()
    }
}

impl Default for MockPage {
    fn default() -> Self {
        Self {
            elements: HashMap::new(),
            styles: HashMap::new(),
            evaluations: HashMap::new(),
            ready_state: "complete".to_string(),
            navigation_error: None,
            click_reactions: Vec::new(),
            drag_reactions: Vec::new(),
            release_reactions: Vec::new(),
            pressed: None,
            viewport: (1280, 720),
            history: Vec::new(),
            pointer_log: Vec::new(),
            typed: Vec::new(),
            close_calls: 0,
        }
    }
}

impl MockPage {
    /// Replace the matches for a locator
    pub fn set_elements(&mut self, locator: &Locator, elements: Vec<ElementSnapshot>) {
        self.elements
            .insert(locator.to_string(), Track::fixed(elements));
    }

    /// Remove every match for a locator
    pub fn clear_elements(&mut self, locator: &Locator) {
        self.set_elements(locator, Vec::new());
    }

    /// Script successive query results for a locator
    pub fn script_elements(&mut self, locator: &Locator, frames: Vec<Vec<ElementSnapshot>>) {
        let fallback = frames.last().cloned().unwrap_or_default();
        self.elements
            .insert(locator.to_string(), Track::scripted(frames, fallback));
    }

    /// Replace a style value
    pub fn set_style(&mut self, query: &StyleQuery, value: Option<&str>) {
        self.styles
            .insert(query.to_string(), Track::fixed(value.map(str::to_string)));
    }

    /// Script successive style reads
    pub fn script_style(&mut self, query: &StyleQuery, frames: Vec<Option<&str>>) {
        let frames: Vec<Option<String>> = frames
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        let fallback = frames.last().cloned().unwrap_or_default();
        self.styles
            .insert(query.to_string(), Track::scripted(frames, fallback));
    }

    /// Whether `locator` currently has a visible match
    #[must_use]
    pub fn shows(&self, locator: &Locator) -> bool {
        self.current_elements(&locator.to_string())
            .iter()
            .any(|e| e.visible)
    }

    fn current_elements(&self, key: &str) -> Vec<ElementSnapshot> {
        self.elements
            .get(key)
            .map(|t| t.current.clone())
            .unwrap_or_default()
    }

    fn fire_clicks(&mut self, at: Point) {
        let mut reactions = std::mem::take(&mut self.click_reactions);
        for (key, reaction) in &mut reactions {
            let hit = self
                .current_elements(key)
                .iter()
                .any(|e| e.visible && e.bbox.is_some_and(|b| b.contains(&at)));
            if hit {
                reaction(self);
            }
        }
        reactions.append(&mut self.click_reactions);
        self.click_reactions = reactions;
    }

    fn fire_drag(&mut self, trace: &PointerTrace) {
        let mut reactions = std::mem::take(&mut self.drag_reactions);
        for reaction in &mut reactions {
            reaction(trace, self);
        }
        reactions.append(&mut self.drag_reactions);
        self.drag_reactions = reactions;
    }

    fn fire_release(&mut self, trace: &PointerTrace) {
        let mut reactions = std::mem::take(&mut self.release_reactions);
        for reaction in &mut reactions {
            reaction(trace, self);
        }
        reactions.append(&mut self.release_reactions);
        self.release_reactions = reactions;
    }

    fn png(width: u32, height: u32) -> HarnessResult<Vec<u8>> {
        let img = image::RgbaImage::new(width.max(1), height.max(1));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        Ok(buf)
    }
}

/// Mock driver for unit testing
///
/// Cloning shares the same page, so a test can keep a handle for inspection
/// after handing the driver to a session.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    page: Arc<Mutex<MockPage>>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the page state
    pub fn page(&self) -> MutexGuard<'_, MockPage> {
        self.page.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a single visible match
    #[must_use]
    pub fn with_element(self, locator: &Locator, element: ElementSnapshot) -> Self {
        self.page().set_elements(locator, vec![element]);
        self
    }

    /// Set the viewport reported in full-page screenshots
    #[must_use]
    pub fn with_viewport(self, width: u32, height: u32) -> Self {
        self.page().viewport = (width, height);
        self
    }

    /// Make the next navigation fail
    #[must_use]
    pub fn failing_navigation(self, message: impl Into<String>) -> Self {
        self.page().navigation_error = Some(message.into());
        self
    }

    /// Set `document.readyState`
    pub fn set_ready_state(&self, state: impl Into<String>) {
        self.page().ready_state = state.into();
    }

    /// Set the value returned for an exact script
    pub fn set_evaluation(&self, script: impl Into<String>, value: serde_json::Value) {
        self.page().evaluations.insert(script.into(), value);
    }

    /// Run `reaction` when a click is released over a visible match of `locator`
    pub fn on_click<F>(&self, locator: &Locator, reaction: F)
    where
        F: FnMut(&mut MockPage) + Send + 'static,
    {
        self.page()
            .click_reactions
            .push((locator.to_string(), Box::new(reaction)));
    }

    /// Run `reaction` on every move while the button is held; the trace's
    /// `up` is the current pointer position
    pub fn on_drag<F>(&self, reaction: F)
    where
        F: FnMut(&PointerTrace, &mut MockPage) + Send + 'static,
    {
        self.page().drag_reactions.push(Box::new(reaction));
    }

    /// Run `reaction` on every button release with the pressed pointer path
    pub fn on_release<F>(&self, reaction: F)
    where
        F: FnMut(&PointerTrace, &mut MockPage) + Send + 'static,
    {
        self.page().release_reactions.push(Box::new(reaction));
    }

    /// Check if a call with this prefix was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.page().history.iter().any(|c| c.starts_with(prefix))
    }

    /// Number of `close` calls
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.page().close_calls
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> HarnessResult<()> {
        let mut page = self.page();
        page.history.push(format!("navigate:{url}"));
        match page.navigation_error.take() {
            Some(message) => Err(HarnessError::Navigation {
                url: url.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }

    async fn ready_state(&self) -> HarnessResult<String> {
        Ok(self.page().ready_state.clone())
    }

    async fn query(&self, selector: &Selector) -> HarnessResult<Vec<ElementSnapshot>> {
        let mut page = self.page();
        let key = selector.to_string();
        Ok(page
            .elements
            .get_mut(&key)
            .map(Track::observe)
            .unwrap_or_default())
    }

    async fn style_value(&self, query: &StyleQuery) -> HarnessResult<Option<String>> {
        let mut page = self.page();
        Ok(page
            .styles
            .get_mut(&query.to_string())
            .and_then(Track::observe))
    }

    async fn evaluate(&self, script: &str) -> HarnessResult<serde_json::Value> {
        self.page()
            .evaluations
            .get(script)
            .cloned()
            .ok_or_else(|| HarnessError::Evaluation {
                message: format!("no mock result for script: {script}"),
            })
    }

    async fn pointer(&mut self, event: PointerEvent) -> HarnessResult<()> {
        let mut page = self.page();
        page.history.push(format!("pointer:{}", event.label()));
        page.pointer_log.push(event);
        match event {
            PointerEvent::Down(p) => page.pressed = Some((p, Vec::new())),
            PointerEvent::Move(p) => {
                let held = page.pressed.as_mut().map(|(down, moves)| {
                    moves.push(p);
                    PointerTrace {
                        down: *down,
                        moves: moves.clone(),
                        up: p,
                    }
                });
                if let Some(trace) = held {
                    page.fire_drag(&trace);
                }
            }
            PointerEvent::Up(p) => {
                if let Some((down, moves)) = page.pressed.take() {
                    let trace = PointerTrace { down, moves, up: p };
                    page.fire_release(&trace);
                }
                page.fire_clicks(p);
            }
            PointerEvent::Wheel { .. } => {}
        }
        Ok(())
    }

    async fn insert_text(
        &mut self,
        selector: &Selector,
        _index: usize,
        text: &str,
    ) -> HarnessResult<()> {
        let mut page = self.page();
        page.history.push(format!("insert_text:{selector}"));
        page.typed.push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn scroll_into_view(&mut self, selector: &Selector, _index: usize) -> HarnessResult<()> {
        self.page()
            .history
            .push(format!("scroll_into_view:{selector}"));
        Ok(())
    }

    async fn screenshot(&self, scope: ScreenshotScope) -> HarnessResult<Screenshot> {
        let mut page = self.page();
        page.history.push("screenshot".to_string());
        let (w, h) = match scope {
            ScreenshotScope::FullPage | ScreenshotScope::Viewport => page.viewport,
            ScreenshotScope::Clip(b) => (b.width.round() as u32, b.height.round() as u32),
        };
        Screenshot::from_png(MockPage::png(w, h)?)
    }

    async fn close(&mut self) -> HarnessResult<()> {
        let mut page = self.page();
        page.history.push("close".to_string());
        page.close_calls += 1;
        Ok(())
    }
}
