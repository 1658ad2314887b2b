//! Tripwire CLI library
//!
//! Command-line front end for the Tripwire verification harness: argument
//! parsing, configuration layering, logging setup and suite reporting.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{parse_viewport, Cli, ColorArg, Commands, ConfigArgs, HarnessArgs, RunArgs};
pub use config::{resolve_harness_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::{check_suite, select_scenarios, SuiteRunner};
