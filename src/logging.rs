//! Logging initialization.
//!
//! The terminal UI owns stdout, so log lines only go to a file. Without a
//! configured file no subscriber is installed and `tracing` events are dropped.

use std::fs::OpenOptions;
use std::sync::{Mutex, Once};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn init(config: &Config) -> Result<()> {
    let Some(path) = config.log_file.as_ref() else {
        return Ok(());
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    INIT_ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init();
    });

    Ok(())
}
