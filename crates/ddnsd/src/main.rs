// # ddnsd - Bunny.net DDNS updater
//
// This binary is a THIN integration layer: all reconciliation logic lives in
// ddns-core. It is responsible for:
// 1. Parsing the command line
// 2. Locating and loading the configuration file
// 3. Building the log sinks
// 4. Wiring the HTTP IP source and the Bunny.net provider into the engine
// 5. Running one pass, or passes until SIGINT/SIGTERM
//
// ## Configuration
//
// The configuration file is looked up in this order:
// - `--config PATH`
// - `$BUNNY_DDNS_CONFIG_DIR/config.toml`
// - `./config.toml`
//
// The API key may be overridden with `BUNNY_DDNS_API_KEY`.
//
// ## Example
//
// ```bash
// ddnsd                      # one pass, then exit
// ddnsd --daemon             # update every daemon.interval seconds
// ddnsd --dry-run --config /etc/bunny-ddns/config.toml
// ```

mod logging;

use clap::Parser;
use ddns_core::config::DdnsConfig;
use ddns_core::engine::{Reconciler, Scheduler};
use ddns_core::LogContext;
use ddns_ip_http::HttpIpSource;
use ddns_provider_bunny::BunnyProvider;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Environment variable naming the configuration directory
const CONFIG_DIR_ENV: &str = "BUNNY_DDNS_CONFIG_DIR";

/// Configuration file name inside the configuration directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Log file name used when `logging.path` is not set
const LOG_FILE_NAME: &str = "ddns.log";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (every zone failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (the one-shot pass failed)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Keep Bunny.net DNS records pointed at this host's public IP
#[derive(Debug, Parser)]
#[command(name = "ddnsd", version, about)]
struct Args {
    /// Run continuously, updating every `daemon.interval` seconds
    #[arg(long)]
    daemon: bool,

    /// Path to the configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log intended changes without modifying any record
    #[arg(long)]
    dry_run: bool,
}

/// Pick the configuration file from the CLI flag, the config-dir variable,
/// or the working directory
fn resolve_config_path(cli: Option<PathBuf>, config_dir: Option<OsString>) -> PathBuf {
    if let Some(path) = cli {
        return path;
    }
    match config_dir {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir).join(CONFIG_FILE_NAME),
        _ => PathBuf::from(CONFIG_FILE_NAME),
    }
}

/// Directory holding the configuration file ("." for a bare file name)
fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.clone(), std::env::var_os(CONFIG_DIR_ENV));
    let dir = config_dir(&config_path);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!(
            "Failed to create config directory {}: {}",
            dir.display(),
            e
        );
        return DdnsExitCode::ConfigError.into();
    }

    let config = match DdnsConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let log = match logging::build_log_context(&config.logging, &dir.join(LOG_FILE_NAME)) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Failed to set up logging: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Lines logged by this binary go to the same sinks as the engine's
    let _guard = tracing::dispatcher::set_default(log.dispatch());

    info!(
        "Configuration loaded from {}: {} zone(s)",
        config_path.display(),
        config.zones.len()
    );

    // Strictly sequential work: a current-thread runtime is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(&args, &config, log)).into()
}

/// Build the engine and run it in the requested mode
async fn run(args: &Args, config: &DdnsConfig, log: LogContext) -> DdnsExitCode {
    let ip_source = match HttpIpSource::from_config(&config.ip_detection) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to create IP source: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let provider = match BunnyProvider::from_config(config, args.dry_run) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to create Bunny.net client: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let reconciler =
        Reconciler::new(Box::new(ip_source), Box::new(provider)).with_log_context(log);
    let scheduler = Scheduler::new(reconciler, config);

    if args.daemon {
        scheduler.run_until(wait_for_shutdown()).await;
        return DdnsExitCode::CleanShutdown;
    }

    match scheduler.run_once().await {
        Ok(_) => DdnsExitCode::CleanShutdown,
        Err(e) => {
            error!("DDNS update failed: {}", e);
            DdnsExitCode::RuntimeError
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() {
    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to set up signal handlers ({}), waiting for Ctrl-C only", e);
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to wait for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
                return;
            }
        };

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", signal);
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => {
            error!("Failed to wait for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
