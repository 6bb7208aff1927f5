mod cmd;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use covers_core::InsightError;
use covers_core::config::resolve_config;
use covers_core::error::ErrorCode;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cmd::Context;
use crate::output::{CliError, OutputMode, render_error, resolve_output_mode};

#[derive(Parser, Debug)]
#[command(
    name = "covers",
    author,
    version,
    about = "covers: sales insights from a restaurant order export",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Sales dataset (CSV with a header row).
    #[arg(long, global = true, env = "COVERS_DATA", value_name = "PATH")]
    data: Option<PathBuf>,

    /// Config file to use instead of ./covers.toml or the user config.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Headline numbers: revenue, orders, average order value.
    #[command(after_help = "EXAMPLES:\n    covers summary --data sales.csv\n    covers summary --year 2023 --month 2")]
    Summary(cmd::summary::SummaryArgs),

    /// Top spenders and most loyal customers.
    #[command(after_help = "EXAMPLES:\n    covers customers --limit 5\n    covers customers --weekday sat --weekday sun")]
    Customers(cmd::customers::CustomersArgs),

    /// Revenue and quantity per category.
    Categories(cmd::categories::CategoriesArgs),

    /// Revenue and quantity per item.
    #[command(after_help = "EXAMPLES:\n    covers items --in Drinks\n    covers items --year 2023 -n 10")]
    Items(cmd::items::ItemsArgs),

    /// Orders per day of the week.
    Weekdays(cmd::weekdays::WeekdaysArgs),

    /// Revenue over time.
    #[command(after_help = "EXAMPLES:\n    covers trend --year 2023 --month 3\n    covers trend --granularity month")]
    Trend(cmd::trend::TrendArgs),

    /// Years and months present in the data.
    Periods(cmd::periods::PeriodsArgs),

    /// Every panel at once.
    #[command(after_help = "EXAMPLES:\n    covers report --format json > report.json\n    covers report --trend-month 12")]
    Report(cmd::report::ReportArgs),

    /// Generate shell completions.
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("COVERS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "covers=debug,warn"
        } else if verbose {
            "covers=info,warn"
        } else {
            "covers=warn"
        })
    });

    let format = env::var("COVERS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Map a command failure to the structured error shown to the user.
fn to_cli_error(err: &anyhow::Error) -> CliError {
    if let Some(insight) = err.downcast_ref::<InsightError>() {
        return CliError::from(insight);
    }
    if err.is::<cmd::NoDataset>() {
        return CliError::with_details(
            err.to_string(),
            "pass --data <PATH>, set COVERS_DATA, or set [data].path in covers.toml",
            ErrorCode::DatasetUnreadable.code(),
        );
    }
    CliError::new(format!("{err:#}"))
}

fn run(cli: Cli) -> Result<(), (OutputMode, anyhow::Error)> {
    let fallback = resolve_output_mode(cli.format, cli.json, None);

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command)
            .map_err(|err| (fallback, err));
    }

    let project_root = env::current_dir().map_err(|err| (fallback, anyhow::Error::from(err)))?;
    let config = resolve_config(cli.config.as_deref(), &project_root)
        .map_err(|err| (fallback, err))?;
    let output = resolve_output_mode(cli.format, cli.json, config.config.report.output.as_deref());
    debug!(origin = ?config.origin, ?output, "configuration resolved");

    let ctx = Context {
        config,
        data: cli.data,
        output,
    };

    let result = match cli.command {
        Commands::Summary(ref args) => cmd::summary::run_summary(args, &ctx),
        Commands::Customers(ref args) => cmd::customers::run_customers(args, &ctx),
        Commands::Categories(ref args) => cmd::categories::run_categories(args, &ctx),
        Commands::Items(ref args) => cmd::items::run_items(args, &ctx),
        Commands::Weekdays(ref args) => cmd::weekdays::run_weekdays(args, &ctx),
        Commands::Trend(ref args) => cmd::trend::run_trend(args, &ctx),
        Commands::Periods(ref args) => cmd::periods::run_periods(args, &ctx),
        Commands::Report(ref args) => cmd::report::run_report(args, &ctx),
        Commands::Completions(_) => Ok(()),
    };
    result.map_err(|err| (output, err))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err((mode, err)) => {
            debug!(error = ?err, "command failed");
            if let Err(render_err) = render_error(mode, &to_cli_error(&err)) {
                eprintln!("error: {err:#} (while reporting: {render_err})");
            }
            ExitCode::FAILURE
        }
    }
}
