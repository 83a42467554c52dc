//! Tracing subscriber setup for the binary.
//!
//! Filter precedence: explicit directive argument, then DOCKHAND_LOG, then RUST_LOG, then
//! "warn". Initialisation happens at most once per process.

use std::env;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "DOCKHAND_LOG";

static INIT: OnceCell<()> = OnceCell::new();

/// Resolve the filter directive without touching the global subscriber.
pub fn log_directive(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| env::var(ENV_LOG).ok())
        .or_else(|| env::var("RUST_LOG").ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "warn".to_string())
}

/// Install a stderr fmt subscriber. Returns false when a subscriber was already installed.
pub fn telemetry_init(explicit: Option<&str>) -> bool {
    if INIT.get().is_some() {
        return false;
    }
    let directive = log_directive(explicit);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("dockhand: invalid log filter {directive:?} ({e}); using \"warn\"");
        EnvFilter::new("warn")
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        return false;
    }
    let _ = INIT.set(());
    true
}
