use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use fauxwork::prelude::*;
use fauxwork::{ENGINE_NAME, VERSION as LIB_VERSION};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code for a run ended by Ctrl+C, as shells report SIGINT.
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "fauxwork", version)]
#[command(about = "Print convincing fake system activity", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run modules until a limit is reached or Ctrl+C (the default).
    Run(RunArgs),
    /// List the available modules.
    List,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Only run these modules (comma-separated, case-insensitive).
    #[arg(short, long, value_delimiter = ',')]
    modules: Vec<String>,

    /// Global speed factor. 2.0 runs twice as fast.
    #[arg(short, long)]
    speed: Option<f64>,

    /// Print this many lines without any delay at startup.
    #[arg(short, long)]
    instant_print_lines: Option<u64>,

    /// Exit after this many seconds.
    #[arg(long, value_name = "SECS")]
    exit_after_time: Option<f64>,

    /// Exit after this many modules have run.
    #[arg(long, value_name = "N")]
    exit_after_modules: Option<u64>,

    /// Seed the random source for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Read settings from a TOML file.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log scheduler activity to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Never style output, even on a terminal.
    #[arg(long)]
    no_color: bool,
}

/// Layers command-line flags over the file and environment settings.
fn apply_overrides(mut config: RunConfig, args: &RunArgs) -> Result<RunConfig> {
    if !args.modules.is_empty() {
        config.enabled_modules = args.modules.clone();
    }
    if let Some(speed) = args.speed {
        config.speed_factor = speed;
    }
    if let Some(lines) = args.instant_print_lines {
        config.instant_print_lines = lines;
    }
    if let Some(secs) = args.exit_after_time {
        config.exit_after_duration = Some(
            Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid --exit-after-time value: {secs}"))?,
        );
    }
    if let Some(count) = args.exit_after_modules {
        config.exit_after_module_count = Some(count);
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_banner() {
    const LOGO_TEXT: &str = include_str!("../logo.log");
    println!("{}", LOGO_TEXT.cyan());

    let version_string = format!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );
    println!("{}", "-".repeat(60).dimmed());
    println!("{}", version_string);
    println!("{}", "-".repeat(60).dimmed());
}

fn list_modules() -> Result<()> {
    print_banner();
    let registry = ModuleRegistry::from_modules(all_modules())?;
    let mut modules: Vec<_> = registry.iter().map(|(_, m)| m).collect();
    modules.sort_by(|a, b| a.name().cmp(b.name()));
    println!("Available modules:");
    for module in modules {
        println!("  {:<12} {}", module.name().yellow().bold(), module.signature().dimmed());
    }
    Ok(())
}

/// Mirrors scheduler events into the log at debug level.
fn spawn_event_listener(scheduler: &Scheduler) {
    let mut events = scheduler.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            debug!("[EVENT] {:?}", event);
        }
    });
}

/// Cancels `cancel` on the first Ctrl+C.
fn spawn_interrupt_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current pause.");
            cancel.cancel();
        }
    });
}

/// Requested module names that match nothing in `registry`.
fn unknown_modules(registry: &ModuleRegistry, config: &RunConfig) -> Vec<String> {
    config
        .normalized_enabled()
        .into_iter()
        .filter(|name| registry.find(name).is_none())
        .collect()
}

/// Maps a run outcome to the process exit status: 0 when an exit condition
/// stopped the run, 130 when it was interrupted, 1 on any error.
fn exit_code(result: &Result<RunSummary>) -> u8 {
    match result {
        Ok(summary) if summary.was_cancelled() => EXIT_CANCELLED,
        Ok(_) => 0,
        Err(_) => 1,
    }
}

fn report(error: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".red().bold(), error);
}

fn finish(result: Result<RunSummary>) -> ExitCode {
    if let Err(e) = &result {
        report(e);
    }
    ExitCode::from(exit_code(&result))
}

async fn run(args: RunArgs) -> Result<RunSummary> {
    let config = RunConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    let config = apply_overrides(config, &args)?;

    let sink: Arc<dyn OutputSink> = if args.no_color {
        Arc::new(PlainSink::default())
    } else {
        sink_for_stdout()
    };

    let mut scheduler = Scheduler::new(all_modules(), config, sink)?;
    for name in unknown_modules(scheduler.registry(), scheduler.config()) {
        warn!("Ignoring unknown module '{}'.", name);
    }
    if args.verbose {
        spawn_event_listener(&scheduler);
    }

    let cancel = CancelToken::new();
    spawn_interrupt_handler(cancel.clone());

    info!("{} v{} starting.", ENGINE_NAME, LIB_VERSION);
    let summary = scheduler.run(&cancel).await?;
    Ok(summary)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = match &cli.command {
        Some(Command::Run(args)) => args.verbose,
        _ => cli.run.verbose,
    };
    init_tracing(verbose);

    match cli.command {
        Some(Command::List) => match list_modules() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                report(&e);
                ExitCode::FAILURE
            }
        },
        Some(Command::Run(args)) => finish(run(args).await),
        None => finish(run(cli.run).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "fauxwork",
            "-m",
            "cargo, Bootlog",
            "--speed",
            "2.5",
            "--exit-after-modules",
            "3",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.modules, vec!["cargo", " Bootlog"]);
        assert_eq!(cli.run.speed, Some(2.5));
        assert_eq!(cli.run.exit_after_modules, Some(3));
    }

    #[test]
    fn test_run_subcommand_takes_run_flags() {
        let cli = Cli::try_parse_from(["fauxwork", "run", "-s", "2", "-m", "journal"]).unwrap();
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected the run subcommand");
        };
        assert_eq!(args.speed, Some(2.0));
        assert_eq!(args.modules, vec!["journal"]);
        assert_eq!(cli.run.speed, None);
    }

    #[test]
    fn test_top_level_flags_conflict_with_subcommand() {
        assert!(Cli::try_parse_from(["fauxwork", "-s", "2", "list"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let summary = |reason| RunSummary {
            reason,
            modules_completed: 3,
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(exit_code(&Ok(summary(StopReason::ModuleCountReached))), 0);
        assert_eq!(exit_code(&Ok(summary(StopReason::DurationElapsed))), 0);
        assert_eq!(exit_code(&Ok(summary(StopReason::Cancelled))), 130);
        let failed: Result<RunSummary> = Err(FauxError::module("cargo", "boom").into());
        assert_eq!(exit_code(&failed), 1);
    }

    #[test]
    fn test_unknown_modules_are_reported() {
        let registry = ModuleRegistry::from_modules(all_modules()).unwrap();
        let config = RunConfig {
            enabled_modules: vec!["Cargo".into(), "carg".into(), " ".into()],
            ..Default::default()
        };
        assert_eq!(unknown_modules(&registry, &config), vec!["carg"]);
    }

    #[test]
    fn test_list_subcommand() {
        let cli = Cli::try_parse_from(["fauxwork", "list"]).unwrap();
        assert!(matches!(cli.command, Some(Command::List)));
    }

    #[test]
    fn test_overrides_win_over_loaded_config() {
        let base = RunConfig {
            speed_factor: 4.0,
            seed: Some(1),
            ..Default::default()
        };
        let args = RunArgs {
            modules: vec!["journal".into()],
            instant_print_lines: Some(10),
            exit_after_time: Some(2.5),
            ..Default::default()
        };
        let config = apply_overrides(base, &args).unwrap();
        assert_eq!(config.enabled_modules, vec!["journal"]);
        assert_eq!(config.speed_factor, 4.0);
        assert_eq!(config.instant_print_lines, 10);
        assert_eq!(config.exit_after_duration, Some(Duration::from_millis(2500)));
        assert_eq!(config.seed, Some(1));
    }

    #[test]
    fn test_negative_exit_time_is_rejected() {
        let args = RunArgs {
            exit_after_time: Some(-1.0),
            ..Default::default()
        };
        assert!(apply_overrides(RunConfig::default(), &args).is_err());
    }
}
