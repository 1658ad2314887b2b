//! Browser control for scenario runs.
//!
//! With the `browser` feature this provides [`ChromiumDriver`], a
//! [`PageDriver`](crate::driver::PageDriver) backed by chromiumoxide over the
//! Chrome `DevTools` Protocol, and [`ChromiumLauncher`], which starts one fresh
//! browser per scenario. Without the feature only [`BrowserConfig`] exists and
//! scenarios run against [`MockDriver`](crate::driver::MockDriver).

use serde::{Deserialize, Serialize};

/// Desktop user agent used by drag scenarios so the app picks pointer sensors
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Device scale factor
    pub device_scale_factor: f64,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            device_scale_factor: 1.0,
            chromium_path: None,
            user_agent: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::items_after_statements)]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{
        ElementSnapshot, PageDriver, PointerEvent, Screenshot, ScreenshotScope, StyleQuery,
    };
    use crate::harness::DriverLauncher;
    use crate::locator::{Point, Selector};
    use crate::result::{HarnessError, HarnessResult};
    use async_trait::async_trait;
    use base64::Engine;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::input::{
        DispatchMouseEventParams, DispatchMouseEventType, InsertTextParams, MouseButton,
    };
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams, Viewport as ClipRect,
    };
    use chromiumoxide::cdp::js_protocol::runtime::{EventConsoleApiCalled, EventExceptionThrown};
    use chromiumoxide::handler::viewport::Viewport;
    use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use tracing::{debug, warn};

    fn launch_error(e: impl std::fmt::Display) -> HarnessError {
        HarnessError::BrowserLaunch {
            message: e.to_string(),
        }
    }

    fn input_error(e: impl std::fmt::Display) -> HarnessError {
        HarnessError::Input {
            message: e.to_string(),
        }
    }

    fn eval_error(e: impl std::fmt::Display) -> HarnessError {
        HarnessError::Evaluation {
            message: e.to_string(),
        }
    }

    fn screenshot_error(e: impl std::fmt::Display) -> HarnessError {
        HarnessError::Screenshot {
            message: e.to_string(),
        }
    }

    /// One browser with one page, driven over CDP
    #[derive(Debug)]
    pub struct ChromiumDriver {
        browser: CdpBrowser,
        page: CdpPage,
        handler: JoinHandle<()>,
        listeners: Vec<JoinHandle<()>>,
        pressed: bool,
        closed: bool,
    }

    impl ChromiumDriver {
        /// Launch a new browser and open a blank page
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: &BrowserConfig) -> HarnessResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height)
                .viewport(Viewport {
                    width: config.viewport_width,
                    height: config.viewport_height,
                    device_scale_factor: Some(config.device_scale_factor),
                    emulating_mobile: false,
                    is_landscape: false,
                    has_touch: false,
                });

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            if let Some(ref ua) = config.user_agent {
                builder = builder.arg(format!("--user-agent={ua}"));
            }

            let cdp_config = builder.build().map_err(launch_error)?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config)
                .await
                .map_err(launch_error)?;

            let handler = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(launch_error)?;
            let listeners = Self::forward_console(&page).await;

            debug!(
                target: "tripwire::browser",
                width = config.viewport_width,
                height = config.viewport_height,
                headless = config.headless,
                "browser launched"
            );

            Ok(Self {
                browser,
                page,
                handler,
                listeners,
                pressed: false,
                closed: false,
            })
        }

        /// Forward page console output and uncaught exceptions to tracing
        async fn forward_console(page: &CdpPage) -> Vec<JoinHandle<()>> {
            let mut listeners = Vec::new();
            if let Ok(mut events) = page.event_listener::<EventConsoleApiCalled>().await {
                listeners.push(tokio::spawn(async move {
                    while let Some(event) = events.next().await {
                        let text = event
                            .args
                            .iter()
                            .map(|arg| {
                                arg.value
                                    .as_ref()
                                    .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                                    .or_else(|| arg.description.clone())
                                    .unwrap_or_default()
                            })
                            .collect::<Vec<_>>()
                            .join(" ");
                        debug!(target: "tripwire::console", kind = ?event.r#type, "{text}");
                    }
                }));
            }
            if let Ok(mut events) = page.event_listener::<EventExceptionThrown>().await {
                listeners.push(tokio::spawn(async move {
                    while let Some(event) = events.next().await {
                        warn!(
                            target: "tripwire::console",
                            "page error: {}",
                            event.exception_details.text
                        );
                    }
                }));
            }
            listeners
        }

        async fn eval_json(&self, script: &str) -> HarnessResult<serde_json::Value> {
            let result = self.page.evaluate(script).await.map_err(eval_error)?;
            Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
        }

        async fn run_on_element(
            &self,
            selector: &Selector,
            index: usize,
            body: &str,
        ) -> HarnessResult<()> {
            let found = self
                .eval_json(&selector.to_element_script(index, body))
                .await?;
            if found.as_bool() == Some(true) {
                Ok(())
            } else {
                Err(HarnessError::ElementNotFound {
                    selector: selector.to_string(),
                })
            }
        }

        /// Page scroll position; clip rectangles are in page coordinates
        async fn scroll_offset(&self) -> HarnessResult<Point> {
            let value = self
                .eval_json("({ x: window.scrollX, y: window.scrollY })")
                .await?;
            Ok(serde_json::from_value(value)?)
        }

        async fn dispatch_mouse(&self, params: DispatchMouseEventParams) -> HarnessResult<()> {
            self.page.execute(params).await.map_err(input_error)?;
            Ok(())
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumDriver {
        async fn navigate(&mut self, url: &str, timeout: Duration) -> HarnessResult<()> {
            let nav_error = |message: String| HarnessError::Navigation {
                url: url.to_string(),
                message,
            };
            match tokio::time::timeout(timeout, self.page.goto(url)).await {
                Ok(Ok(_)) => Ok(()),
                Ok(Err(e)) => Err(nav_error(e.to_string())),
                Err(_) => Err(nav_error(format!(
                    "no response within {}ms",
                    timeout.as_millis()
                ))),
            }
        }

        async fn ready_state(&self) -> HarnessResult<String> {
            let value = self.eval_json("document.readyState").await?;
            Ok(value.as_str().unwrap_or_default().to_string())
        }

        async fn query(&self, selector: &Selector) -> HarnessResult<Vec<ElementSnapshot>> {
            let value = self.eval_json(&selector.to_snapshot_script()).await?;
            Ok(serde_json::from_value(value)?)
        }

        async fn style_value(&self, query: &StyleQuery) -> HarnessResult<Option<String>> {
            let value = self.eval_json(&query.to_script()).await?;
            Ok(serde_json::from_value(value)?)
        }

        async fn evaluate(&self, script: &str) -> HarnessResult<serde_json::Value> {
            self.eval_json(script).await
        }

        async fn pointer(&mut self, event: PointerEvent) -> HarnessResult<()> {
            let at = event.point();
            let builder = DispatchMouseEventParams::builder().x(at.x).y(at.y);
            let params = match event {
                PointerEvent::Move(_) => {
                    let builder = builder.r#type(DispatchMouseEventType::MouseMoved);
                    if self.pressed {
                        builder.button(MouseButton::Left).buttons(1)
                    } else {
                        builder
                    }
                }
                PointerEvent::Down(_) => builder
                    .r#type(DispatchMouseEventType::MousePressed)
                    .button(MouseButton::Left)
                    .buttons(1)
                    .click_count(1),
                PointerEvent::Up(_) => builder
                    .r#type(DispatchMouseEventType::MouseReleased)
                    .button(MouseButton::Left)
                    .click_count(1),
                PointerEvent::Wheel {
                    delta_x, delta_y, ..
                } => builder
                    .r#type(DispatchMouseEventType::MouseWheel)
                    .delta_x(delta_x)
                    .delta_y(delta_y),
            }
            .build()
            .map_err(input_error)?;

            self.dispatch_mouse(params).await?;
            match event {
                PointerEvent::Down(_) => self.pressed = true,
                PointerEvent::Up(_) => self.pressed = false,
                _ => {}
            }
            Ok(())
        }

        async fn insert_text(
            &mut self,
            selector: &Selector,
            index: usize,
            text: &str,
        ) -> HarnessResult<()> {
            self.run_on_element(
                selector,
                index,
                "el.focus(); if (typeof el.select === 'function') el.select();",
            )
            .await?;
            self.page
                .execute(InsertTextParams::new(text))
                .await
                .map_err(input_error)?;
            Ok(())
        }

        async fn scroll_into_view(&mut self, selector: &Selector, index: usize) -> HarnessResult<()> {
            self.run_on_element(
                selector,
                index,
                "el.scrollIntoView({ block: 'center', inline: 'center' });",
            )
            .await
        }

        async fn screenshot(&self, scope: ScreenshotScope) -> HarnessResult<Screenshot> {
            let data = match scope {
                ScreenshotScope::FullPage | ScreenshotScope::Viewport => self
                    .page
                    .screenshot(
                        ScreenshotParams::builder()
                            .format(CaptureScreenshotFormat::Png)
                            .full_page(matches!(scope, ScreenshotScope::FullPage))
                            .build(),
                    )
                    .await
                    .map_err(screenshot_error)?,
                ScreenshotScope::Clip(_) => {
                    let clip = scope
                        .page_clip(self.scroll_offset().await?)
                        .ok_or_else(|| screenshot_error("clip scope without a box"))?;
                    let params = CaptureScreenshotParams::builder()
                        .format(CaptureScreenshotFormat::Png)
                        .clip(ClipRect {
                            x: clip.x,
                            y: clip.y,
                            width: clip.width,
                            height: clip.height,
                            scale: 1.0,
                        })
                        .capture_beyond_viewport(true)
                        .build();
                    let shot = self.page.execute(params).await.map_err(screenshot_error)?;
                    base64::engine::general_purpose::STANDARD
                        .decode(&shot.data)
                        .map_err(screenshot_error)?
                }
            };
            Screenshot::from_png(data)
        }

        async fn close(&mut self) -> HarnessResult<()> {
            if self.closed {
                return Ok(());
            }
            self.closed = true;
            for listener in self.listeners.drain(..) {
                listener.abort();
            }
            let closed = self.browser.close().await.map_err(launch_error);
            if closed.is_ok() {
                if let Err(e) = self.browser.wait().await {
                    warn!(target: "tripwire::browser", "waiting for browser exit: {e}");
                }
            }
            self.handler.abort();
            closed.map(|_| ())
        }
    }

    /// Launches a fresh [`ChromiumDriver`] per scenario
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ChromiumLauncher;

    #[async_trait]
    impl DriverLauncher for ChromiumLauncher {
        type Driver = ChromiumDriver;

        async fn launch(&self, config: &BrowserConfig) -> HarnessResult<ChromiumDriver> {
            ChromiumDriver::launch(config).await
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumDriver, ChromiumLauncher};
