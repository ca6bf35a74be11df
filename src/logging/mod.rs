use crate::Result;
use anyhow::{anyhow, Context};
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize the tracing framework for the process.
///
/// The filter comes from `SKEIN_LOG`, falling back to `RUST_LOG`, then to
/// `info`. `SKEIN_LOG_FORMAT=json` selects structured console output. Errors
/// when invoked more than once per process unless tests reset the guard.
pub fn init() -> Result<()> {
    if LOGGER_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(anyhow!("logging already initialized"));
    }

    let env_filter = EnvFilter::try_from_env("SKEIN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to configure tracing level")?;

    let registry = tracing_subscriber::registry().with(env_filter);
    match env::var("SKEIN_LOG_FORMAT").as_deref() {
        Ok("json") => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }

    Ok(())
}

#[cfg(test)]
/// Reset the initialization guard so tests can reconfigure logging.
pub fn reset_for_tests() {
    LOGGER_INITIALIZED.store(false, Ordering::SeqCst);
}
