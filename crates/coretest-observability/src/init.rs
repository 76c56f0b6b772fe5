// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output always goes to stderr. With the `file-logging` feature and a log directory,
//! a plain-text log file is also written under a timestamped run folder:
//! ```text
//! <log_dir>/
//!   └── run_20250101_120000/
//!       └── coretest.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

/// Keeps background log writers alive; logs are flushed when dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    run_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving log files, if file logging is active
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }
}

/// Folder name for a logging run started at `started`
pub fn run_folder_name(started: DateTime<Utc>) -> String {
    format!("run_{}", started.format("%Y%m%d_%H%M%S"))
}

/// Install the global subscriber
///
/// # Arguments
/// * `debug_flags` - crates raised to debug level
/// * `base_level` - level for everything else (`system.log_level`)
/// * `log_dir` - base folder for log files; ignored without the `file-logging` feature
///
/// # Errors
///
/// Fails if the filter is malformed, the run folder cannot be created, or a global
/// subscriber is already installed.
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    base_level: &str,
    log_dir: Option<&Path>,
) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(base_level);
    let env_filter = EnvFilter::try_new(&filter)
        .with_context(|| format!("Invalid log filter: {}", filter))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_filter(env_filter)
        .boxed();
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let mut file_guards = Vec::new();
    let mut run_dir = None;

    if let Some(base) = log_dir {
        #[cfg(feature = "file-logging")]
        {
            let run_folder = base.join(run_folder_name(Utc::now()));
            std::fs::create_dir_all(&run_folder).with_context(|| {
                format!("Failed to create log directory: {}", run_folder.display())
            })?;

            let appender = tracing_appender::rolling::daily(&run_folder, "coretest.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            file_guards.push(guard);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(EnvFilter::try_new(&filter)?)
                .boxed();
            layers.push(file_layer);
            run_dir = Some(run_folder);
        }
        #[cfg(not(feature = "file-logging"))]
        {
            eprintln!(
                "Log directory {} ignored: built without the file-logging feature",
                base.display()
            );
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        run_dir,
    })
}
