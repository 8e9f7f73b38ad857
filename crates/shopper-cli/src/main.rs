//! Weather Shopper CLI
//!
//! ## Usage
//!
//! ```bash
//! shopper run                               # One run against the live site
//! shopper run --runs 3 --report runs.json   # Three concurrent runs
//! shopper run --headed -v                   # Watch the browser
//! shopper config --check shopper.yaml       # Validate a config file
//! ```

use clap::Parser;
use std::fs;
use std::process::ExitCode;
use std::time::Instant;
use weather_shopper::prelude::*;
use weather_shopper_cli::{
    logging, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, ConfigArgs, LogFormat,
    Reporter, RunArgs, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    match cli.command {
        Commands::Run(args) => run_workflows(&config, &args),
        Commands::Config(args) => run_config(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    let log_format: LogFormat = cli.log_format.clone().into();

    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .with_log_format(log_format)
}

// =============================================================================
// run
// =============================================================================

/// File configuration with command-line overrides applied, validated
fn shopper_config(args: &RunArgs) -> CliResult<ShopperConfig> {
    let mut config = ShopperConfig::load(args.config.as_deref())?;
    if let Some(url) = &args.base_url {
        config = config.with_base_url(url.clone());
    }
    if args.headed {
        config = config.with_headless(false);
    }
    if let Some(browser) = args.browser {
        config.browser.engine = browser.engine().to_string();
    }
    if let Some(dir) = &args.artifacts_dir {
        config = config.with_artifacts_dir(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn run_workflows(cli: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let config = shopper_config(args)?;
    let log_path = logging::init_with_file(cli, &config.log_dir, &config.browser.engine)?;
    let reporter = Reporter::new(cli.color.should_color(), cli.verbosity.is_quiet() || args.json);
    reporter.info(&format!("log file: {}", log_path.display()));

    let runs = usize::from(args.runs);
    let rt = tokio::runtime::Runtime::new()?;
    let started = Instant::now();
    let results = rt.block_on(execute(runs, args.simulate, &config))?;
    let elapsed = started.elapsed();

    let mut reports = Vec::with_capacity(results.len());
    for (index, result) in results.iter().enumerate() {
        match result {
            Ok(outcome) => {
                reporter.run(index, &outcome.report);
                reports.push(&outcome.report);
            }
            Err(e) => reporter.launch_failed(index, &e.to_string()),
        }
    }
    let passed = reports.iter().filter(|r| r.is_success()).count();
    let failed = runs - passed;

    if args.json || args.report.is_some() {
        let json = serde_json::to_string_pretty(&reports)
            .map_err(|e| CliError::report_generation(e.to_string()))?;
        if args.json {
            println!("{json}");
        }
        if let Some(path) = &args.report {
            fs::write(path, &json)
                .map_err(|e| CliError::report_generation(format!("{}: {e}", path.display())))?;
            reporter.info(&format!("report written to {}", path.display()));
        }
    }

    reporter.summary(passed, failed, elapsed);
    if failed > 0 {
        return Err(CliError::RunsFailed {
            failed,
            total: runs,
        });
    }
    Ok(())
}

async fn execute(
    runs: usize,
    simulate: bool,
    config: &ShopperConfig,
) -> CliResult<Vec<ShopperResult<RunOutcome>>> {
    if simulate {
        let mut site = MockSite::new()
            .with_base_url(config.site.base_url.clone())
            .with_success_text(config.site.success_text.clone());
        site.payment_frame.clone_from(&config.site.payment_frame);
        let site = &site;
        return Ok(run_many(
            runs,
            |_| async move { Ok::<_, ShopperError>(MockDriver::new(site.clone())) },
            config,
        )
        .await);
    }
    launch_browsers(runs, config).await
}

#[cfg(feature = "browser")]
async fn launch_browsers(
    runs: usize,
    config: &ShopperConfig,
) -> CliResult<Vec<ShopperResult<RunOutcome>>> {
    let settings = &config.browser;
    Ok(run_many(runs, |_| ChromiumDriver::launch(settings), config).await)
}

#[cfg(not(feature = "browser"))]
async fn launch_browsers(
    _runs: usize,
    _config: &ShopperConfig,
) -> CliResult<Vec<ShopperResult<RunOutcome>>> {
    Err(CliError::invalid_argument(
        "built without the `browser` feature; rebuild with --features browser or use --simulate",
    ))
}

// =============================================================================
// config
// =============================================================================

fn run_config(cli: &CliConfig, args: &ConfigArgs) -> CliResult<()> {
    logging::init_console(cli)?;

    let config = match &args.check {
        Some(path) => {
            let config = ShopperConfig::load(Some(path))?;
            config.validate()?;
            println!("{}: ok", path.display());
            if !args.show {
                return Ok(());
            }
            config
        }
        None => ShopperConfig::load(args.config.as_deref())?,
    };
    print!("{}", config.to_yaml()?);
    Ok(())
}
