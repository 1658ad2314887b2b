//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a deferred query: it holds a [`Selector`] expression and is
//! re-evaluated against the live DOM every time an action or probe needs it.
//! Nothing here caches element handles, because any preceding action may have
//! re-rendered the page.
//!
//! # Design
//!
//! - **Strict by default**: actions and probes fail with an ambiguity error when
//!   a selector resolves to more than one element.
//! - **Scoped disambiguation**: stacked overlays are told apart with
//!   [`Locator::within_topmost`] instead of positional guessing.
//! - **Fluent API**: chainable builders for role names, text filters and scopes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A point in viewport coordinates (CSS pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other`, `t` in `[0, 1]`
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Bounding box for an element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Point offset from the top-left corner
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// The same box moved by `(dx, dy)`
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Check if a point is inside this bounding box
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Whether the box has a non-zero area
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Selector expression for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "header button")
    Css(String),
    /// Innermost elements whose text matches
    Text {
        /// Text to match
        text: String,
        /// Whole-string match instead of case-insensitive substring
        exact: bool,
    },
    /// ARIA role with optional accessible name
    Role {
        /// Role name (button, dialog, textbox, ...)
        role: String,
        /// Accessible name filter
        name: Option<String>,
        /// Whole-string name match
        exact: bool,
    },
    /// Base selector filtered to elements containing text
    HasText {
        /// Base selector
        base: Box<Selector>,
        /// Text the element must contain
        text: String,
    },
    /// Inner selector evaluated inside a scope
    Within {
        /// Scope selector
        scope: Box<Selector>,
        /// Selector resolved inside each scope match
        inner: Box<Selector>,
        /// Only search the visible scope match that is on top
        topmost: bool,
    },
    /// One element of an ordered list of matches
    Nth {
        /// Base selector
        base: Box<Selector>,
        /// Zero-based index
        index: usize,
    },
}

/// Helper functions injected ahead of every resolution expression
pub const JS_PRELUDE: &str = r#"
const __twNorm = (s) => (s || '').replace(/\s+/g, ' ').trim();
const __twVisible = (el) => {
  const r = el.getBoundingClientRect();
  const cs = window.getComputedStyle(el);
  return r.width > 0 && r.height > 0 && cs.visibility !== 'hidden' && cs.display !== 'none';
};
const __twTextMatch = (t, want, exact) => exact
  ? __twNorm(t) === __twNorm(want)
  : __twNorm(t).toLowerCase().includes(__twNorm(want).toLowerCase());
const __twByText = (root, want, exact) => Array.from(root.querySelectorAll('*'))
  .filter((el) => !['SCRIPT', 'STYLE', 'HEAD', 'TITLE'].includes(el.tagName))
  .filter((el) => __twTextMatch(el.textContent, want, exact))
  .filter((el) => !Array.from(el.children).some((c) => __twTextMatch(c.textContent, want, exact)));
const __twRoles = {
  button: 'button,[role="button"],input[type="button"],input[type="submit"]',
  link: 'a[href],[role="link"]',
  textbox: 'input:not([type]),input[type="text"],input[type="email"],input[type="search"],textarea,[role="textbox"]',
  dialog: 'dialog,[role="dialog"],[role="alertdialog"]',
  heading: 'h1,h2,h3,h4,h5,h6,[role="heading"]',
  checkbox: 'input[type="checkbox"],[role="checkbox"]',
};
const __twAccName = (el) => __twNorm(
  el.getAttribute('aria-label') || (el.tagName === 'INPUT' ? el.value : '') || el.textContent
);
const __twByRole = (root, role, name, exact) => Array.from(root.querySelectorAll(__twRoles[role] || ('[role="' + role + '"]')))
  .filter((el) => name === null || __twTextMatch(__twAccName(el), name, exact));
const __twHit = (el) => {
  const r = el.getBoundingClientRect();
  const top = document.elementFromPoint(r.x + r.width / 2, r.y + r.height / 2);
  return top !== null && el.contains(top);
};
const __twOnScreen = (el) => {
  const r = el.getBoundingClientRect();
  const cx = r.x + r.width / 2;
  const cy = r.y + r.height / 2;
  return cx >= 0 && cy >= 0 && cx < window.innerWidth && cy < window.innerHeight;
};
const __twTopmost = (els) => {
  const vis = els.filter(__twVisible);
  if (vis.length === 0) return [];
  const hit = vis.filter(__twHit);
  const pool = hit.length > 0 ? hit : vis;
  return [pool[pool.length - 1]];
};
const __twUnique = (els) => Array.from(new Set(els));
const __twSnapshot = (els) => els.map((el) => {
  const r = el.getBoundingClientRect();
  const visible = __twVisible(el);
  return {
    tag: el.tagName.toLowerCase(),
    text: __twNorm(el.innerText !== undefined ? el.innerText : el.textContent),
    class_name: typeof el.className === 'string' ? el.className : (el.getAttribute('class') || ''),
    visible,
    enabled: !el.disabled && el.getAttribute('aria-disabled') !== 'true',
    // off-screen centres cannot be hit-tested
    receives_pointer: !visible || !__twOnScreen(el) || __twHit(el),
    bbox: visible ? { x: r.x, y: r.y, width: r.width, height: r.height } : null,
  };
});
"#;

fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| String::from("\"\""))
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a text selector (case-insensitive substring)
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: false,
        }
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: None,
            exact: false,
        }
    }

    /// JavaScript expression evaluating to an array of matched elements,
    /// searched below `root`
    #[must_use]
    pub fn to_js(&self, root: &str) -> String {
        match self {
            Self::Css(css) => format!("Array.from({root}.querySelectorAll({}))", js_string(css)),
            Self::Text { text, exact } => {
                format!("__twByText({root}, {}, {exact})", js_string(text))
            }
            Self::Role { role, name, exact } => {
                let name = name.as_deref().map_or_else(|| "null".to_string(), js_string);
                format!("__twByRole({root}, {}, {name}, {exact})", js_string(role))
            }
            Self::HasText { base, text } => format!(
                "({}).filter((el) => __twTextMatch(el.textContent, {}, false))",
                base.to_js(root),
                js_string(text)
            ),
            Self::Within {
                scope,
                inner,
                topmost,
            } => {
                let scopes = if *topmost {
                    format!("__twTopmost({})", scope.to_js(root))
                } else {
                    scope.to_js(root)
                };
                format!(
                    "__twUnique(({scopes}).flatMap((__scope) => {}))",
                    inner.to_js("__scope")
                )
            }
            Self::Nth { base, index } => {
                format!("({}).slice({index}, {})", base.to_js(root), index + 1)
            }
        }
    }

    /// Full script returning element snapshots for this selector
    #[must_use]
    pub fn to_snapshot_script(&self) -> String {
        format!(
            "(() => {{ {JS_PRELUDE}\nreturn __twSnapshot({}); }})()",
            self.to_js("document")
        )
    }

    /// Script that runs `body` with `el` bound to match number `index`.
    /// Evaluates to `false` when there is no such match.
    #[must_use]
    pub fn to_element_script(&self, index: usize, body: &str) -> String {
        format!(
            "(() => {{ {JS_PRELUDE}\nconst el = ({})[{index}];\nif (!el) return false;\n{body}\nreturn true; }})()",
            self.to_js("document")
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "css={css}"),
            Self::Text { text, exact } => {
                if *exact {
                    write!(f, "text=\"{text}\"")
                } else {
                    write!(f, "text~\"{text}\"")
                }
            }
            Self::Role { role, name, exact } => match name {
                Some(name) if *exact => write!(f, "role={role}[name=\"{name}\"]"),
                Some(name) => write!(f, "role={role}[name~\"{name}\"]"),
                None => write!(f, "role={role}"),
            },
            Self::HasText { base, text } => write!(f, "{base}:has-text(\"{text}\")"),
            Self::Within {
                scope,
                inner,
                topmost,
            } => {
                if *topmost {
                    write!(f, "topmost({scope}) >> {inner}")
                } else {
                    write!(f, "{scope} >> {inner}")
                }
            }
            Self::Nth { base, index } => write!(f, "{base} >> nth={index}"),
        }
    }
}

/// Locator options for customizing behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Auto-wait override (None = session default)
    pub timeout: Option<Duration>,
    /// Whether to require a single-element match
    pub strict: bool,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            strict: true,
        }
    }
}

/// A deferred, re-evaluated reference to DOM elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    options: LocatorOptions,
}

impl Locator {
    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            options: LocatorOptions::default(),
        }
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::css(selector))
    }

    /// Locate the innermost elements containing `text` (case-insensitive)
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::text(text))
    }

    /// Locate the innermost elements whose whole text equals `text`
    #[must_use]
    pub fn exact_text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::Text {
            text: text.into(),
            exact: true,
        })
    }

    /// Locate by ARIA role
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::from_selector(Selector::role(role))
    }

    /// Filter a role locator by accessible name
    ///
    /// On non-role locators this behaves like [`Locator::has_text`].
    #[must_use]
    pub fn name(self, name: impl Into<String>) -> Self {
        match self.selector {
            Selector::Role { role, exact, .. } => Self {
                selector: Selector::Role {
                    role,
                    name: Some(name.into()),
                    exact,
                },
                options: self.options,
            },
            _ => self.has_text(name),
        }
    }

    /// Require whole-string matching for text and role names
    #[must_use]
    pub fn exact(self) -> Self {
        let selector = match self.selector {
            Selector::Role { role, name, .. } => Selector::Role {
                role,
                name,
                exact: true,
            },
            Selector::Text { text, .. } => Selector::Text { text, exact: true },
            other => other,
        };
        Self {
            selector,
            options: self.options,
        }
    }

    /// Keep only matches whose text contains `text`
    #[must_use]
    pub fn has_text(self, text: impl Into<String>) -> Self {
        Self {
            selector: Selector::HasText {
                base: Box::new(self.selector),
                text: text.into(),
            },
            options: self.options,
        }
    }

    /// Resolve `inner` inside every match of this locator
    #[must_use]
    pub fn locate(&self, inner: Self) -> Self {
        Self {
            selector: Selector::Within {
                scope: Box::new(self.selector.clone()),
                inner: Box::new(inner.selector),
                topmost: false,
            },
            options: inner.options,
        }
    }

    /// Resolve this locator only inside the topmost visible match of `scope`
    /// (the overlay that owns the hit-test point at its centre)
    #[must_use]
    pub fn within_topmost(self, scope: Self) -> Self {
        Self {
            selector: Selector::Within {
                scope: Box::new(scope.selector),
                inner: Box::new(self.selector),
                topmost: true,
            },
            options: self.options,
        }
    }

    /// Pick one element of an ordered list (e.g. the second day group).
    /// Not for telling stacked overlays apart; use [`Locator::within_topmost`].
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        Self {
            selector: Selector::Nth {
                base: Box::new(self.selector),
                index,
            },
            options: self.options,
        }
    }

    /// Set a custom auto-wait timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Disable strict mode (allow multiple matches; actions use the first)
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Whether strict single-match is required
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.options.strict
    }

    /// Timeout to use given the session default
    #[must_use]
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.options.timeout.unwrap_or(default)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.selector.fmt(f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_selector_js() {
            let js = Selector::css("header button").to_js("document");
            assert_eq!(js, "Array.from(document.querySelectorAll(\"header button\"))");
        }

        #[test]
        fn test_css_selector_escapes_quotes() {
            let js = Selector::css("input[name=\"trip\"]").to_js("document");
            assert!(js.contains("input[name=\\\"trip\\\"]"));
        }

        #[test]
        fn test_text_selector_js() {
            let js = Selector::text("Save Changes?").to_js("document");
            assert!(js.starts_with("__twByText(document"));
            assert!(js.contains("\"Save Changes?\""));
            assert!(js.ends_with("false)"));
        }

        #[test]
        fn test_role_without_name_uses_null() {
            let js = Selector::role("dialog").to_js("document");
            assert!(js.contains("null"));
        }

        #[test]
        fn test_nth_slices_one_element() {
            let js = Locator::css(".day-group").nth(1).selector().to_js("document");
            assert!(js.ends_with(".slice(1, 2)"));
        }

        #[test]
        fn test_topmost_scope_js() {
            let loc = Locator::role("button")
                .name("Save")
                .exact()
                .within_topmost(Locator::css(".fixed.inset-0"));
            let js = loc.selector().to_js("document");
            assert!(js.contains("__twTopmost("));
            assert!(js.contains("__twByRole(__scope"));
        }

        #[test]
        fn test_snapshot_script_includes_prelude() {
            let script = Selector::css("header").to_snapshot_script();
            assert!(script.contains("const __twSnapshot"));
            assert!(script.contains("return __twSnapshot("));
            assert!(script.contains("receives_pointer: !visible || !__twOnScreen(el) || __twHit(el)"));
        }

        #[test]
        fn test_element_script_binds_index() {
            let script = Selector::css("input").to_element_script(0, "el.focus();");
            assert!(script.contains("[0];"));
            assert!(script.contains("el.focus();"));
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_display_forms() {
            assert_eq!(Locator::css("header").to_string(), "css=header");
            assert_eq!(Locator::text("My Journeys").to_string(), "text~\"My Journeys\"");
            assert_eq!(
                Locator::exact_text("15").to_string(),
                "text=\"15\""
            );
            assert_eq!(
                Locator::role("button").name("Save").exact().to_string(),
                "role=button[name=\"Save\"]"
            );
            assert_eq!(
                Locator::css(".day-group").nth(1).to_string(),
                "css=.day-group >> nth=1"
            );
        }

        #[test]
        fn test_display_scoped() {
            let loc = Locator::css("button").within_topmost(Locator::css(".fixed.inset-0"));
            assert_eq!(loc.to_string(), "topmost(css=.fixed.inset-0) >> css=button");
            let nested = Locator::css("div").has_text("Trip Name").locate(Locator::css("input"));
            assert_eq!(
                nested.to_string(),
                "css=div:has-text(\"Trip Name\") >> css=input"
            );
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_locator_defaults_strict() {
            let loc = Locator::css("button");
            assert!(loc.is_strict());
            assert!(loc.options().timeout.is_none());
        }

        #[test]
        fn test_locator_timeout_override() {
            let loc = Locator::css("button").with_timeout(Duration::from_secs(10));
            assert_eq!(loc.timeout_or(Duration::from_secs(1)), Duration::from_secs(10));
            let plain = Locator::css("button");
            assert_eq!(plain.timeout_or(Duration::from_secs(1)), Duration::from_secs(1));
        }

        #[test]
        fn test_name_on_css_becomes_text_filter() {
            let loc = Locator::css("button").name("Save");
            assert!(matches!(loc.selector(), Selector::HasText { .. }));
        }

        #[test]
        fn test_locate_keeps_inner_options() {
            let loc = Locator::css("form").locate(Locator::css("input").with_strict(false));
            assert!(!loc.is_strict());
        }
    }

    mod geometry_tests {
        use super::*;

        #[test]
        fn test_bounding_box_center_and_contains() {
            let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
            assert_eq!(bbox.center(), Point::new(60.0, 45.0));
            assert!(bbox.contains(&Point::new(10.0, 20.0)));
            assert!(!bbox.contains(&Point::new(111.0, 20.0)));
        }

        #[test]
        fn test_bounding_box_offset() {
            let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
            assert_eq!(bbox.offset(5.0, 150.0), Point::new(15.0, 170.0));
        }

        #[test]
        fn test_bounding_box_translate_keeps_size() {
            let bbox = BoundingBox::new(10.0, 300.0, 100.0, 50.0).translate(0.0, 1200.0);
            assert_eq!(bbox, BoundingBox::new(10.0, 1500.0, 100.0, 50.0));
        }

        #[test]
        fn test_point_lerp() {
            let a = Point::new(0.0, 0.0);
            let b = Point::new(100.0, 50.0);
            assert_eq!(a.lerp(&b, 0.5), Point::new(50.0, 25.0));
            assert_eq!(a.lerp(&b, 1.0), b);
        }
    }
}
