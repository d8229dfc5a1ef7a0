//! Logging configuration using tracing
//!
//! The terminal belongs to the UI, so everything goes to a daily log file.

use anyhow::Result;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "KIWI_LOG";

const LOG_FILE_NAME: &str = "kiwi.log";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/kiwi/logs/kiwi.log.YYYY-MM-DD`
/// (platform equivalent), one file per day.
///
/// # Examples
/// ```bash
/// KIWI_LOG=debug kiwi
/// KIWI_LOG=kiwi_core=trace kiwi
/// ```
pub fn init() -> Result<()> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("kiwi=info,kiwi_core=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()?;

    tracing::info!("Kiwi starting, log directory: {}", log_dir.display());

    Ok(())
}

fn log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("kiwi").join("logs")
}
