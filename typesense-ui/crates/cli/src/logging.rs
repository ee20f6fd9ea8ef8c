use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::{Context, Result};
use core_types::config::LoggingSection;
use tracing_appender::{non_blocking::WorkerGuard, rolling::Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing for the CLI.
///
/// - Filter: `logging.level`, else `RUST_LOG`, else a level picked from `-v` count.
/// - Human output goes to stderr so stdout stays clean for `--json`.
/// - When `logging.file` is set, a JSON copy is written to a rolling file.
///
/// The returned guard must be held until exit to flush the file writer.
pub fn init_tracing(cfg: &LoggingSection, verbosity: u8) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::new(filter_directive(
        cfg,
        std::env::var("RUST_LOG").ok(),
        verbosity,
    ));

    let (file_layer, guard) = if cfg.file.is_empty() {
        (None, None)
    } else {
        let log_path = PathBuf::from(&cfg.file);
        let (dir, file) = split_dir_file(&log_path)?;
        if !dir.exists() {
            fs::create_dir_all(dir).context("create log directory")?;
        }
        let appender = tracing_appender::rolling::RollingFileAppender::new(
            rotation(&cfg.roll),
            dir,
            file,
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_line_number(true);
        (Some(layer), Some(guard))
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let result = if cfg.format == "json" {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .try_init()
    };

    if let Err(e) = result {
        static WARNED_ONCE: OnceLock<()> = OnceLock::new();
        let msg = e.to_string();
        if !msg.contains("already set") && WARNED_ONCE.set(()).is_ok() {
            eprintln!("Tracing init failed (global subscriber already set?): {msg}");
        }
    }

    Ok(guard)
}

fn filter_directive(cfg: &LoggingSection, rust_log: Option<String>, verbosity: u8) -> String {
    if !cfg.level.is_empty() {
        return cfg.level.clone();
    }
    if let Some(env) = rust_log.filter(|v| !v.is_empty()) {
        return env;
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
    .to_string()
}

fn rotation(roll: &str) -> Rotation {
    match roll {
        "hourly" => Rotation::HOURLY,
        "minutely" => Rotation::MINUTELY,
        "never" => Rotation::NEVER,
        "daily" => Rotation::DAILY,
        other => {
            tracing::warn!("Log rotation '{other}' not supported; falling back to daily.");
            Rotation::DAILY
        }
    }
}

fn split_dir_file(path: &Path) -> Result<(&Path, &str)> {
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("log file missing filename")?;
    Ok((dir, file))
}
