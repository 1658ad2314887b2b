//! Suite runner: scenario selection and progress output

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use std::time::Instant;
use tripwire::{scenarios, DriverLauncher, HarnessConfig, ScenarioRunner, SuiteReport};

/// Resolve requested names against the catalogue, keeping their order
pub fn select_scenarios(requested: &[String], all: bool) -> CliResult<Vec<&'static str>> {
    let known = scenarios::names();
    if all {
        return Ok(known);
    }
    if requested.is_empty() {
        return Err(CliError::invalid_argument(
            "name at least one scenario or pass --all",
        ));
    }

    let mut selected = Vec::with_capacity(requested.len());
    for name in requested {
        let found = known
            .iter()
            .find(|k| **k == *name)
            .ok_or_else(|| CliError::unknown_scenario(name.as_str()))?;
        if !selected.contains(found) {
            selected.push(*found);
        }
    }
    Ok(selected)
}

/// Runs selected scenarios one after another with progress output
#[derive(Debug)]
pub struct SuiteRunner<L: DriverLauncher> {
    runner: ScenarioRunner<L>,
    reporter: ProgressReporter,
    fail_fast: bool,
}

impl<L> SuiteRunner<L>
where
    L: DriverLauncher,
    L::Driver: 'static,
{
    /// Create a suite runner
    #[must_use]
    pub fn new(launcher: L, harness: HarnessConfig, config: &CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self {
            runner: ScenarioRunner::new(launcher, harness),
            reporter,
            fail_fast: config.fail_fast,
        }
    }

    /// Run `names` in order
    ///
    /// # Errors
    ///
    /// Unknown scenario names. Scenario failures are part of the returned
    /// report, not errors.
    pub async fn run(&mut self, names: &[&str]) -> CliResult<SuiteReport> {
        let start = Instant::now();
        let mut suite = SuiteReport::default();

        self.reporter
            .suite_started(names.len(), &self.runner.config().base_url);

        for (index, name) in names.iter().enumerate() {
            let scenario = scenarios::find::<L::Driver>(name)
                .ok_or_else(|| CliError::unknown_scenario(*name))?;
            self.reporter.start_scenario(index, names.len(), name);
            let report = self.runner.run(scenario.as_ref()).await;
            self.reporter.finish_scenario(&report);

            let failed = !report.passed;
            suite.results.push(report);
            if failed && self.fail_fast {
                self.reporter.stopped_early();
                break;
            }
        }
        suite.duration = start.elapsed();

        self.reporter.summary(&suite);
        Ok(suite)
    }
}

/// Map a finished suite to the process outcome
pub fn check_suite(suite: &SuiteReport) -> CliResult<()> {
    if suite.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenarioFailures {
            failed: suite.failed_count(),
            total: suite.total(),
        })
    }
}
