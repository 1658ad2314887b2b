//! Harness configuration, loadable from YAML.
//!
//! ```yaml
//! base_url: http://localhost:5173
//! browser:
//!   headless: true
//!   viewport_width: 1280
//!   viewport_height: 720
//! probe_timeout_ms: 5000
//! artifact_dir: verification
//! ```

use crate::action::{ActionOptions, DEFAULT_ACTION_TIMEOUT_MS};
use crate::browser::BrowserConfig;
use crate::result::{HarnessError, HarnessResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_SETTLE_MS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the app under test is served by default
pub const DEFAULT_BASE_URL: &str = "http://localhost:5173";

/// Default navigation timeout (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default artifact directory
pub const DEFAULT_ARTIFACT_DIR: &str = "verification";

/// Complete harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base URL of the running app
    pub base_url: String,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Navigation timeout in milliseconds
    pub navigation_timeout_ms: u64,
    /// Action auto-wait in milliseconds
    pub action_timeout_ms: u64,
    /// Probe timeout in milliseconds
    pub probe_timeout_ms: u64,
    /// Poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Settle window for negative probes in milliseconds
    pub settle_ms: u64,
    /// Screenshot output root
    pub artifact_dir: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserConfig::default(),
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            action_timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            settle_ms: DEFAULT_SETTLE_MS,
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
        }
    }
}

impl HarnessConfig {
    /// Parse from YAML; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> HarnessResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| HarnessError::config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_yaml_file(path: &Path) -> HarnessResult<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> HarnessResult<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| HarnessError::config(format!("Failed to serialize config: {e}")))
    }

    /// Reject values the harness cannot run with
    pub fn validate(&self) -> HarnessResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(HarnessError::config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.browser.viewport_width == 0 || self.browser.viewport_height == 0 {
            return Err(HarnessError::config("viewport must be non-empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(HarnessError::config("poll_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Join a scenario entry path onto the base URL
    #[must_use]
    pub fn url_for(&self, entry_path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = entry_path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Timeouts and output settings for one session
    #[must_use]
    pub fn session_config(&self, browser: &BrowserConfig) -> SessionConfig {
        let poll = Duration::from_millis(self.poll_interval_ms);
        SessionConfig {
            navigation_timeout: Duration::from_millis(self.navigation_timeout_ms),
            action: ActionOptions::default()
                .with_timeout(Duration::from_millis(self.action_timeout_ms))
                .with_poll_interval(poll),
            wait: WaitOptions::new()
                .with_timeout(Duration::from_millis(self.probe_timeout_ms))
                .with_poll_interval(poll)
                .with_settle(Duration::from_millis(self.settle_ms)),
            viewport: (browser.viewport_width, browser.viewport_height),
            artifact_dir: self.artifact_dir.clone(),
        }
    }
}

/// Resolved settings handed to a [`Session`](crate::session::Session)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Navigation and readiness timeout
    pub navigation_timeout: Duration,
    /// Action auto-wait
    pub action: ActionOptions,
    /// Probe settings
    pub wait: WaitOptions,
    /// Viewport size in CSS pixels
    pub viewport: (u32, u32),
    /// Screenshot output root
    pub artifact_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let config = HarnessConfig::default();
        config.session_config(&config.browser)
    }
}
