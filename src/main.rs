//! Mixed-Audit main entry point
//!
//! This is the command-line interface for the resumable mixed-content auditor.

use anyhow::Context;
use clap::Parser;
use mixed_audit::checkpoint::CheckpointStore;
use mixed_audit::config::{load_config_with_hash, resolve_base_url, Config};
use mixed_audit::crawler::{prepare_pending, run_audit, AuditOptions, AuditOutcome};
use mixed_audit::output::{console, export_tally};
use mixed_audit::session::Credentials;
use mixed_audit::AuditError;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Normal completion, including a run finalized after a disconnect
const EXIT_OK: u8 = 0;
/// Configuration, checkpoint or other fatal error
const EXIT_FATAL: u8 = 1;
const EXIT_EMPTY_CREDENTIALS: u8 = 2;
const EXIT_NO_NEW_TARGETS: u8 = 3;
const EXIT_LOGIN_FAILED: u8 = 4;

/// Mixed-Audit: a resumable mixed-content auditor
///
/// Loads every page in the target list through one logged-in session,
/// records insecure sub-resources and unpublished pages, and keeps
/// checkpoint logs so an interrupted audit resumes where it stopped.
#[derive(Parser, Debug)]
#[command(name = "mixed-audit")]
#[command(version)]
#[command(about = "A resumable mixed-content auditor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Team name, appended to the site base URL
    #[arg(short, long)]
    team: Option<String>,

    /// Login username (prompted when absent)
    #[arg(short, long)]
    username: Option<String>,

    /// Login password (prompted when absent)
    #[arg(short, long)]
    password: Option<String>,

    /// Clear checked pages progress, error log and results before starting
    #[arg(long)]
    clear_data: bool,

    /// Skip identifiers that errored on a previous run
    #[arg(short, long)]
    skip_errors: bool,

    /// Show how many targets are pending without logging in
    #[arg(long, conflicts_with_all = ["tally", "clear_data"])]
    dry_run: bool,

    /// Aggregate the result log and error list into the tally table and exit
    #[arg(long, conflicts_with_all = ["dry_run", "clear_data"])]
    tally: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let result = if cli.dry_run {
        handle_dry_run(&config, &cli)
    } else if cli.tally {
        handle_tally(&config)
    } else {
        handle_audit(&config, &cli).await
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mixed_audit=info,warn"),
            1 => EnvFilter::new("mixed_audit=debug,info"),
            2 => EnvFilter::new("mixed_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load(cli: &Cli) -> anyhow::Result<Config> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles --dry-run: shows the pending queue without logging in
fn handle_dry_run(config: &Config, cli: &Cli) -> anyhow::Result<u8> {
    let root = resolve_base_url(&config.site, cli.team.as_deref())?;
    let store = CheckpointStore::new(&config.files);
    let options = AuditOptions {
        clear_data: false,
        skip_errors: cli.skip_errors,
    };
    let pending = prepare_pending(&store, &config.files.targets, &options)?;

    println!("=== Mixed-Audit Dry Run ===\n");
    println!("Site: {}", root);
    println!("Navigation timeout: {}ms", config.session.navigation_timeout_ms);
    println!("Targets: {}", config.files.targets.display());
    println!("Skip errors: {}", cli.skip_errors);
    println!("Pending: {}", pending.len());
    for id in pending.iter().take(10) {
        println!("  - {}", id);
    }
    if pending.len() > 10 {
        println!("  ... and {} more", pending.len() - 10);
    }

    Ok(if pending.is_empty() {
        EXIT_NO_NEW_TARGETS
    } else {
        EXIT_OK
    })
}

/// Handles --tally: the aggregation stage
fn handle_tally(config: &Config) -> anyhow::Result<u8> {
    let report = export_tally(&config.files).context("Failed to build tally")?;
    console::print_tally_totals(&report);
    println!("Tally written to {}", config.files.tally.display());
    Ok(EXIT_OK)
}

/// Handles the main audit run
async fn handle_audit(config: &Config, cli: &Cli) -> anyhow::Result<u8> {
    let root = resolve_base_url(&config.site, cli.team.as_deref())?;

    let hidden = |label: &str| rpassword::prompt_password(label);
    let credentials = match read_credentials(cli, hidden)? {
        Some(credentials) => credentials,
        None => {
            console::alert("Empty credentials");
            return Ok(EXIT_EMPTY_CREDENTIALS);
        }
    };

    let options = AuditOptions {
        clear_data: cli.clear_data,
        skip_errors: cli.skip_errors,
    };

    // Ctrl-C behaves like the session going away
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finalizing");
            signal.cancel();
        }
    });

    match run_audit(config, &root, &options, &credentials, shutdown).await {
        Ok(AuditOutcome::NoNewTargets) => Ok(EXIT_NO_NEW_TARGETS),
        Ok(AuditOutcome::Completed(_)) => {
            tracing::info!("Audit completed");
            Ok(EXIT_OK)
        }
        Ok(AuditOutcome::Interrupted(stats)) => {
            tracing::warn!(
                "Audit interrupted after {} targets; rerun to resume",
                stats.checked
            );
            Ok(EXIT_OK)
        }
        Err(AuditError::Auth(e)) => {
            tracing::error!("Login failed: {}", e);
            Ok(EXIT_LOGIN_FAILED)
        }
        Err(e) => Err(e.into()),
    }
}

/// Takes credentials from the command line, prompting for missing halves
///
/// A missing password is read through `read_password`, which must not echo
/// (`rpassword::prompt_password` in the binary). Returns None when either
/// half ends up empty.
fn read_credentials<F>(cli: &Cli, read_password: F) -> anyhow::Result<Option<Credentials>>
where
    F: FnOnce(&str) -> io::Result<String>,
{
    let username = match &cli.username {
        Some(username) => username.clone(),
        None => prompt("username: ")?,
    };
    let password = match &cli.password {
        Some(password) => password.clone(),
        None => read_password("password: ").context("Failed to read password")?,
    };

    let credentials = Credentials::new(username, password);
    Ok((!credentials.is_empty()).then_some(credentials))
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
