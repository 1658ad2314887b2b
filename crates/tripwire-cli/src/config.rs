//! CLI configuration
//!
//! Harness settings are layered: built-in defaults, then the YAML file given
//! with `--config`, then individual flags.

use crate::commands::{ColorArg, HarnessArgs};
use crate::error::CliResult;
use serde::{Deserialize, Serialize};
use tripwire::HarnessConfig;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - failures only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - harness info logs
    Verbose,
    /// Debug - everything
    Debug,
}

impl Verbosity {
    /// Map `-q` / `-v` counts to a level; quiet wins
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stderr().features().colors_supported(),
        }
    }
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Stop after the first failing scenario
    pub fail_fast: bool,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set fail fast
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Resolve the harness configuration: defaults < YAML file < flags
pub fn resolve_harness_config(args: &HarnessArgs) -> CliResult<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::from_yaml_file(path)?,
        None => HarnessConfig::default(),
    };

    if let Some(url) = &args.base_url {
        config.base_url.clone_from(url);
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some((w, h)) = args.viewport {
        config.browser.viewport_width = w;
        config.browser.viewport_height = h;
    }
    if let Some(ua) = &args.user_agent {
        config.browser.user_agent = Some(ua.clone());
    }
    if let Some(path) = &args.chromium {
        config.browser.chromium_path = Some(path.clone());
    }
    if args.no_sandbox {
        config.browser.sandbox = false;
    }
    if let Some(dir) = &args.artifacts {
        config.artifact_dir.clone_from(dir);
    }
    if let Some(ms) = args.timeout {
        config.probe_timeout_ms = ms;
        config.action_timeout_ms = ms;
    }
    if let Some(ms) = args.poll {
        config.poll_interval_ms = ms;
    }

    config.validate()?;
    Ok(config)
}
