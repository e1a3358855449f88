// spd/src/main.rs
use std::fs;
use std::process;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use spd_aio::{start_sweeper, CommandRunner, SystemRunner};
use spd_common::credentials::CredentialContext;
use spd_common::error::{Result as spdResult, SpdError};
use spd_common::Settings;
use spd_core::JobContext;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod cli;
mod delivery;
mod routes;
mod server;

use cli::CliArgs;

/// Stderr logging always; a daily `app.log` under the logs directory when it can be created.
fn init_logging(settings: &Settings, verbose: u8) -> Option<WorkerGuard> {
    let level_filter = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("SPD_LOG")
        .from_env_lossy();

    let log_dir = &settings.logs_dir;
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!(
            "{} Failed to create log directory {}: {} (logging to stderr only)",
            "Error:".red().bold(),
            log_dir.display(),
            e
        );
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .try_init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, "app.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr.and(non_blocking_appender))
        .with_ansi(false)
        .try_init();
    debug!("Writing logs to: {}/app.log", log_dir.display());
    Some(guard)
}

#[tokio::main]
async fn main() -> spdResult<()> {
    let cli_args = CliArgs::parse();

    let mut settings = Settings::load().map_err(|e| {
        SpdError::Config(format!("Could not load settings: {e}"))
    })?;
    cli_args.apply(&mut settings);
    settings.ensure_dirs()?;

    let _log_guard = init_logging(&settings, cli_args.verbose);

    let credentials = CredentialContext::from_settings(&settings);
    match &credentials.browser_session {
        Some(session) => info!("Browser cookies: {}", session.cookie_spec()),
        None => info!("Browser cookies: unavailable"),
    }
    match credentials.cookie_file_path() {
        Some(path) => info!("Cookie file: {}", path.display()),
        None => warn!("No cookie file found; only unauthenticated attempts will run"),
    }

    if let Err(e) = start_sweeper(
        settings.tmp_root.clone(),
        settings.cleanup_ttl,
        settings.cleanup_interval,
    ) {
        warn!("Could not start the cleanup thread: {}", e);
    }

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let job = JobContext::new(Arc::new(settings), Arc::new(credentials), runner);

    if let Err(e) = server::run(server::AppState::new(job)).await {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
    Ok(())
}
