// Copyright (c) 2026 rezky_nightky

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::RainError;

pub const LOG_ENV: &str = "DIGIRAIN_LOG";

/// Sends tracing output to `path`. The terminal belongs to the rain while it
/// runs, so logging is file-only and off unless asked for.
pub fn init_file_logging(path: &Path) -> Result<(), RainError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| RainError::Logging(e.to_string()))
}
