//! Custodian - interactive console for the customer account registry.
//!
//! Reads commands from stdin and writes results to stdout; logs go to
//! stderr. An optional first argument names a settings file to use instead
//! of the one in the platform config directory.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod command;
mod console;
mod settings;

use std::io;
use std::path::PathBuf;

use custodian_core::AccountRegistry;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console::Console;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "custodian=info,custodian_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Starting custodian");

    let settings = match std::env::args_os().nth(1) {
        Some(path) => settings::load(&PathBuf::from(path))?,
        None => settings::load_or_default(&settings::default_path())?,
    };
    info!(
        "Lockout after {} failed attempts",
        settings.lockout.failed_attempt_limit
    );

    let registry = AccountRegistry::with_policy(settings.lockout);
    let mut console = Console::new(&registry);
    console.run(io::stdin().lock(), io::stdout().lock())?;
    if let Some(handle) = console.session() {
        info!("Closing session for {handle}");
    }

    info!("Shutting down with {} accounts", registry.len());
    Ok(())
}
