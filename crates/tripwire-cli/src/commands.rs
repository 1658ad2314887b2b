//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tripwire: end-to-end UI verification for the trip planner
#[derive(Parser, Debug)]
#[command(name = "tripwire")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run verification scenarios against the running app
    Run(RunArgs),

    /// List available scenarios
    List,

    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

/// Settings shared by `run` and `config`
#[derive(Args, Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct HarnessArgs {
    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL of the running app
    #[arg(long, env = "TRIPWIRE_BASE_URL")]
    pub base_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Viewport size, e.g. 1280x720
    #[arg(long, value_name = "WxH", value_parser = parse_viewport)]
    pub viewport: Option<(u32, u32)>,

    /// Override the browser user agent
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Chromium executable
    #[arg(long, env = "CHROMIUM_PATH", value_name = "PATH")]
    pub chromium: Option<String>,

    /// Disable the Chromium sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Screenshot output directory
    #[arg(long, value_name = "DIR")]
    pub artifacts: Option<PathBuf>,

    /// Probe and action timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Poll interval in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll: Option<u64>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenarios to run, in order
    #[arg(value_name = "SCENARIO", conflicts_with = "all")]
    pub scenarios: Vec<String>,

    /// Run every scenario
    #[arg(long)]
    pub all: bool,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Harness settings
    #[command(flatten)]
    pub harness: HarnessArgs,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Harness settings
    #[command(flatten)]
    pub harness: HarnessArgs,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Auto-detect terminal support
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Parse `WIDTHxHEIGHT`
pub fn parse_viewport(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: u32 = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let height: u32 = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    if width == 0 || height == 0 {
        return Err("viewport must be non-empty".to_string());
    }
    Ok((width, height))
}
