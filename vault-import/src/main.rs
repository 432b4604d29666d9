//! vault-import - verify an import batch against the catalog
//!
//! Exits non-zero when the batch is rejected. Nothing is written to the
//! catalog.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use vault_import::cli::{run, Args};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting vault-import v{}", env!("CARGO_PKG_VERSION"));

    let outcome = run(Args::parse()).await?;
    Ok(outcome.exit_code())
}
