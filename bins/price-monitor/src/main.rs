//! price-monitor - barcode price-check kiosk
//!
//! Scan a barcode, see the item and its price for a few seconds, then back
//! to the logo.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use pricemonitor_api_client::{LookupOutcome, PriceClient};
use pricemonitor_cli::output::{self, Status};
use pricemonitor_cli::progress;
use pricemonitor_cli::terminal::{Layout, TerminalDisplay};
use pricemonitor_core::config::{
    Config, FileSettings, ForceRemote, Settings, SettingsProvider, StaticSettings,
};
use pricemonitor_core::error::exit_codes;
use pricemonitor_core::ErrorCode;
use pricemonitor_kiosk::{format_amount, messages, Controller, HttpLookup};
use pricemonitor_telemetry::{TelemetryConfig, TelemetryGuard, Timer};
use pricemonitor_updater::{UpdateStatus, Updater};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "price-monitor")]
#[command(about = "Barcode price-check kiosk")]
#[command(version)]
struct Cli {
    /// Settings file
    #[arg(short, long, global = true, env = "PRICEMON_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use the head-office server for this session
    #[arg(long, global = true)]
    remote: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the kiosk, reading scanned barcodes from stdin (default)
    Run,

    /// Look a single barcode up
    Lookup {
        /// Barcode to look up
        barcode: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download and stage a newer package from the head-office server
    Update {
        /// Install without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the effective settings
    Config {
        /// Only print which settings file is used
        #[arg(long)]
        path: bool,
    },
}

fn main() {
    let code = run(Cli::parse());
    std::process::exit(code);
}

fn run(cli: Cli) -> i32 {
    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            return e.code.exit_code();
        }
    };
    if cli.remote {
        config.settings.server.local_mode = false;
    }

    // Held until the end of `run` so the log file is flushed
    let _telemetry = init_logging(&config.settings, cli.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            Status::error(&format!("Cannot start runtime: {e}"));
            return exit_codes::FAILURE;
        }
    };

    runtime.block_on(async {
        match cli.command.unwrap_or(Commands::Run) {
            Commands::Run => match run_kiosk(&config, cli.remote).await {
                Ok(()) => exit_codes::SUCCESS,
                Err(e) => {
                    Status::error(&format!("{e:#}"));
                    exit_codes::FAILURE
                }
            },
            Commands::Lookup { barcode, json } => run_lookup(&config.settings, &barcode, json).await,
            Commands::Update { yes } => run_update(&config.settings, yes).await,
            Commands::Config { path } => run_config(&config, path),
        }
    })
}

fn init_logging(settings: &Settings, verbose: u8) -> TelemetryGuard {
    let telemetry = TelemetryConfig::from_logging(&settings.logging, verbose);
    match pricemonitor_telemetry::init_with_config(telemetry) {
        Ok(guard) => guard,
        Err(e) => {
            Status::warning(&format!("Logging disabled: {e}"));
            TelemetryGuard::default()
        }
    }
}

fn settings_provider(config: &Config, remote: bool) -> Result<Arc<dyn SettingsProvider>> {
    let provider: Arc<dyn SettingsProvider> = match (&config.path, remote) {
        (Some(path), false) => Arc::new(FileSettings::open(path)?),
        (Some(path), true) => Arc::new(ForceRemote::new(FileSettings::open(path)?)),
        (None, _) => Arc::new(StaticSettings::new(config.settings.clone())),
    };
    Ok(provider)
}

async fn run_kiosk(config: &Config, remote: bool) -> Result<()> {
    let provider = settings_provider(config, remote).context("Loading settings")?;
    let display = TerminalDisplay::new(Layout::for_text_size(config.settings.display.text_size));
    let (controller, handle) = Controller::new(HttpLookup, provider, display);

    info!(
        base_url = %config.settings.active_base_url(),
        settings = ?config.path,
        "Kiosk started"
    );
    let kiosk = tokio::spawn(controller.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Reading scanner input")? {
        if !handle.input(format!("{line}\n")) {
            break;
        }
    }

    handle.shutdown();
    kiosk.await.context("Display controller stopped unexpectedly")?;
    Ok(())
}

async fn run_lookup(settings: &Settings, barcode: &str, json: bool) -> i32 {
    let barcode = barcode.trim();
    if barcode.is_empty() {
        Status::error("Barcode is empty");
        return exit_codes::FAILURE;
    }

    let client = match PriceClient::from_settings(settings) {
        Ok(client) => client,
        Err(e) => {
            Status::error(&messages::server_error(&e.to_string()));
            return e.code().exit_code();
        }
    };

    let timer = Timer::start("lookup");
    let result = client.prices().lookup(barcode).await;
    let elapsed = timer.stop();
    let looked_up_at = chrono::Utc::now().to_rfc3339();

    match result {
        Ok(LookupOutcome::Found(record)) => {
            let formatted = format_amount(record.amount(), &settings.display.currency);
            if json {
                let body = serde_json::json!({
                    "status": "found",
                    "barcode": record.barcode(),
                    "item_name": record.item_name(),
                    "price": record.price(),
                    "formatted": formatted,
                    "looked_up_at": looked_up_at,
                });
                println!("{body}");
            } else {
                println!("{}  {}", record.barcode().dimmed(), record.item_name().bold());
                println!("{}", formatted.green().bold());
                println!("{}", output::format_duration(elapsed).dimmed());
            }
            exit_codes::SUCCESS
        }
        Ok(LookupOutcome::NotFound { barcode }) => {
            if json {
                let body = serde_json::json!({
                    "status": "not_found",
                    "barcode": barcode,
                    "looked_up_at": looked_up_at,
                });
                println!("{body}");
            } else {
                Status::warning(&format!(
                    "{}: {}",
                    messages::NOT_FOUND_TITLE,
                    messages::not_found(&barcode)
                ));
            }
            ErrorCode::NotFound.exit_code()
        }
        Err(e) => {
            let message = messages::server_error(&e.to_string());
            if json {
                let body = serde_json::json!({
                    "status": "error",
                    "barcode": barcode,
                    "message": message,
                    "looked_up_at": looked_up_at,
                });
                println!("{body}");
            } else {
                Status::error(&format!("{}: {}", messages::ERROR_TITLE, message));
            }
            e.code().exit_code()
        }
    }
}

async fn run_update(settings: &Settings, yes: bool) -> i32 {
    let updater = match Updater::new(settings.clone()) {
        Ok(updater) => updater,
        Err(e) => {
            Status::error(&e.to_string());
            return e.code.exit_code();
        }
    };

    let spinner = progress::spinner(&format!(
        "Checking {} for a new version...",
        settings.remote_url()
    ));
    let status = updater.check().await;

    let (path, version) = match status {
        Ok(UpdateStatus::Ready { path, version }) => {
            progress::finish_success(&spinner, &format!("Version {version} downloaded"));
            (path, version)
        }
        Ok(UpdateStatus::UpToDate { current, offered }) => {
            progress::finish_success(&spinner, "Check finished");
            Status::success(&format!(
                "Already up to date ({current}, server offers {offered})"
            ));
            return exit_codes::SUCCESS;
        }
        Err(e) if e.code == ErrorCode::NoNewVersion => {
            progress::finish_success(&spinner, "Check finished");
            Status::info("No new version published");
            return exit_codes::SUCCESS;
        }
        Err(e) => {
            progress::finish_error(&spinner, "Update failed");
            Status::error(&e.to_string());
            return e.code.exit_code();
        }
    };

    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    Status::info(&format!(
        "{} ({}) -> {}",
        path.display(),
        output::format_size(size),
        version
    ));

    if !yes {
        match output::confirm(&format!("Install version {version}?")) {
            Ok(true) => {}
            Ok(false) => {
                Status::info("Update left staged, not installed");
                return exit_codes::SUCCESS;
            }
            Err(e) => {
                warn!(error = %e, "Confirmation prompt failed");
                Status::error("Cannot ask for confirmation; rerun with --yes");
                return exit_codes::FAILURE;
            }
        }
    }

    match updater.install(&path, &version) {
        Ok(()) => {
            Status::success(&format!(
                "Version {version} staged at {}; restart the kiosk from it",
                path.display()
            ));
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::error(&e.to_string());
            e.code.exit_code()
        }
    }
}

fn run_config(config: &Config, path_only: bool) -> i32 {
    if path_only {
        match &config.path {
            Some(path) => println!("{}", path.display()),
            None => println!("(built-in defaults)"),
        }
        return exit_codes::SUCCESS;
    }

    match config.settings.to_toml() {
        Ok(toml) => {
            Status::header("Effective settings");
            print!("{toml}");
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::error(&e.to_string());
            e.code.exit_code()
        }
    }
}
