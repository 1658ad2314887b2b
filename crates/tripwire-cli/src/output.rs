//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tripwire::{ScenarioReport, SuiteReport};

/// Result line marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Pass,
    Fail,
    Warn,
}

impl Mark {
    const fn plain(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Warn => "WARN",
        }
    }

    fn styled(self) -> String {
        match self {
            Self::Pass => style("✓").green().bold().to_string(),
            Self::Fail => style("✗").red().bold().to_string(),
            Self::Warn => style("⚠").yellow().bold().to_string(),
        }
    }
}

/// Progress reporter for scenario execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Show a spinner while a scenario runs
    pub fn start_scenario(&mut self, index: usize, total: usize, name: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{prefix}] {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_prefix(format!("{}/{total}", index + 1));
        pb.set_message(name.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    /// Clear the spinner and print the scenario's result line
    pub fn finish_scenario(&mut self, report: &ScenarioReport) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }

        let secs = report.duration.as_secs_f64();
        if report.passed {
            let artifacts = report.record.artifacts.len();
            self.line(
                Mark::Pass,
                &format!("{} ({secs:.2}s, {artifacts} screenshots)", report.name),
            );
            let warnings = report.warnings();
            if warnings > 0 {
                self.line(
                    Mark::Warn,
                    &format!("{}: {warnings} soft checks did not hold", report.name),
                );
            }
        } else {
            let kind = report.error_kind.as_deref().unwrap_or("Error");
            let message = report.error.as_deref().unwrap_or("unknown error");
            self.line(
                Mark::Fail,
                &format!("{} ({secs:.2}s) {kind}: {message}", report.name),
            );
        }
        for skipped in &report.record.skipped {
            self.line(
                Mark::Warn,
                &format!("{}: capture '{skipped}' skipped", report.name),
            );
        }
    }

    /// Announce a suite run
    pub fn suite_started(&self, count: usize, base_url: &str) {
        if self.quiet {
            return;
        }
        let title = format!("Running {count} scenarios against {base_url}");
        let title = if self.use_color {
            style(title).bold().to_string()
        } else {
            title
        };
        let _ = self.term.write_line(&title);
    }

    /// Note that `--fail-fast` cut the suite short
    pub fn stopped_early(&self) {
        self.line(Mark::Warn, "stopping after first failure (--fail-fast)");
    }

    fn line(&self, mark: Mark, message: &str) {
        // failures print even in quiet mode
        if self.quiet && mark != Mark::Fail {
            return;
        }
        let prefix = if self.use_color {
            mark.styled()
        } else {
            mark.plain().to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print the suite summary
    pub fn summary(&self, suite: &SuiteReport) {
        let failed = suite.failed_count();
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let passed = suite.passed_count();
        let total = suite.total();
        let artifacts = suite.artifact_count();
        let duration_secs = suite.duration.as_secs_f64();
        let finished = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} scenarios in {:.2}s ({} passed, {} failed, {} screenshots) at {}",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                artifacts,
                style(finished).dim()
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {duration_secs:.2}s ({passed} passed, {failed} failed, {artifacts} screenshots) at {finished}"
            ));
        }
    }
}
