//! Tripwire CLI: run UI verification scenarios against the trip planner
//!
//! ## Usage
//!
//! ```bash
//! tripwire list                          # Show scenarios
//! tripwire run --all                     # Run every scenario
//! tripwire run plan-drag --headed        # Watch one scenario
//! tripwire config --config tripwire.yaml # Print effective settings
//! ```

use clap::Parser;
use std::process::ExitCode;
use tripwire::scenarios;
use tripwire_cli::{
    logging, resolve_harness_config, select_scenarios, Cli, CliConfig, CliResult, ColorChoice,
    Commands, ConfigArgs, RunArgs, Verbosity,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    logging::init_logging(config.verbosity);

    match cli.command {
        Commands::Run(args) => run_scenarios(config, &args).await,
        Commands::List => {
            run_list();
            Ok(())
        }
        Commands::Config(args) => run_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

#[cfg(feature = "browser")]
async fn run_scenarios(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    let names = select_scenarios(&args.scenarios, args.all)?;
    let harness = resolve_harness_config(&args.harness)?;
    let config = config.with_fail_fast(args.fail_fast);

    let mut runner =
        tripwire_cli::SuiteRunner::new(tripwire::ChromiumLauncher, harness, &config);
    let suite = runner.run(&names).await?;
    tripwire_cli::check_suite(&suite)
}

#[cfg(not(feature = "browser"))]
async fn run_scenarios(_config: CliConfig, args: &RunArgs) -> CliResult<()> {
    select_scenarios(&args.scenarios, args.all)?;
    resolve_harness_config(&args.harness)?;
    Err(tripwire_cli::CliError::invalid_argument(
        "built without browser support; rebuild with --features browser",
    ))
}

fn run_list() {
    let described = scenarios::describe();
    let width = described.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    for (name, description) in described {
        println!("{name:<width$}  {description}");
    }
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let harness = resolve_harness_config(&args.harness)?;
    print!("{}", serde_yaml_ng::to_string(&harness)?);
    Ok(())
}
