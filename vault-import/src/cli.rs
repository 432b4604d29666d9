//! `vault-import` command line
//!
//! Reads an import batch (JSON), opens the catalog read-only and reports
//! whether the batch can be merged. Nothing is written to the catalog.

use crate::verifier::{BatchVerifier, Rejection, VerificationReport};
use crate::{ExistenceOracle, FsResourceChecker, ImportBatch, MemoizedOracle, SqliteOracle};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use vault_common::config::{ImportSettings, RootFolderResolver, SETTINGS_FILE_NAME};
use vault_common::db::{connect_readonly, count_entities};
use vault_common::EntityKind;

#[derive(Parser, Debug, Clone)]
#[command(name = "vault-import", version, about = "Verify a Media Vault import batch")]
pub struct Args {
    /// Import batch file (JSON)
    pub batch: PathBuf,

    /// Root folder holding the catalog and settings
    #[arg(long)]
    pub root_folder: Option<PathBuf>,

    /// Settings file (defaults to <root folder>/vault.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Catalog database, overriding the settings file
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Print the verification report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of one CLI run that got as far as verification
#[derive(Debug)]
pub enum CliOutcome {
    Accepted(VerificationReport),
    Rejected(Rejection),
}

impl CliOutcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliOutcome::Accepted(_) => ExitCode::SUCCESS,
            CliOutcome::Rejected(_) => ExitCode::FAILURE,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, CliOutcome::Accepted(_))
    }
}

/// Settings for this run: an explicit `--config` must exist, the root
/// folder's `vault.toml` may be absent
pub fn load_settings(args: &Args, root_folder: &std::path::Path) -> Result<ImportSettings> {
    let settings = match &args.config {
        Some(path) => ImportSettings::load(path)?,
        None => ImportSettings::load_or_default(&root_folder.join(SETTINGS_FILE_NAME))?,
    };
    Ok(settings)
}

/// Resolve configuration, open the catalog and verify the batch
///
/// `Err` is reserved for failures before verification (settings, missing
/// catalog, unreadable batch); a rejected batch is `Ok(CliOutcome::Rejected)`.
pub async fn run(args: Args) -> Result<CliOutcome> {
    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder.clone())
        .with_config_file(args.config.clone())
        .resolve();
    info!("Root folder: {}", root_folder.display());

    let settings = load_settings(&args, &root_folder)?;

    let db_path = args
        .database
        .clone()
        .unwrap_or_else(|| settings.database_path(&root_folder));
    let pool = connect_readonly(&db_path)
        .await
        .with_context(|| format!("Failed to open catalog {}", db_path.display()))?;

    // Informational only; a broken table surfaces as a rejection below
    for kind in EntityKind::ALL {
        match count_entities(&pool, kind).await {
            Ok(count) => info!(kind = %kind, count, "Catalog entities"),
            Err(e) => warn!(kind = %kind, error = %e, "Could not count catalog entities"),
        }
    }

    let batch = ImportBatch::from_path(&args.batch)?;
    info!(
        "Loaded import batch {} ({} entities)",
        args.batch.display(),
        batch.total()
    );

    let sqlite = SqliteOracle::new(pool.clone()).with_lookup_timeout(settings.lookup_timeout());
    let oracle: Box<dyn ExistenceOracle> = if settings.memoize_lookups {
        Box::new(MemoizedOracle::new(sqlite))
    } else {
        Box::new(sqlite)
    };
    let resources = FsResourceChecker::new().with_base_dir(settings.resource_base_dir.clone());

    let outcome = BatchVerifier::new(oracle.as_ref(), &resources)
        .verify(&batch)
        .await;
    pool.close().await;

    let outcome = match outcome {
        Ok(report) => CliOutcome::Accepted(report),
        Err(rejection) => {
            error!("{}", rejection);
            CliOutcome::Rejected(rejection)
        }
    };
    print_outcome(&outcome, args.json)?;
    Ok(outcome)
}

fn print_outcome(outcome: &CliOutcome, json: bool) -> Result<()> {
    match outcome {
        CliOutcome::Accepted(report) if json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        CliOutcome::Accepted(report) => {
            println!("Import batch accepted ({} entities)", report.total_entities());
            for (kind, count) in report.entities.iter().filter(|(_, count)| **count > 0) {
                println!("  {}: {}", kind, count);
            }
            println!(
                "  references: {} in catalog, {} in batch; resources: {}",
                report.validation.references_in_store,
                report.validation.references_in_batch,
                report.validation.resources_checked
            );
        }
        CliOutcome::Rejected(rejection) if json => {
            let body = serde_json::json!({
                "rejected": true,
                "stage": rejection.stage.to_string(),
                "error": rejection.error.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        CliOutcome::Rejected(rejection) => {
            eprintln!("Import batch rejected: {}", rejection.error);
        }
    }
    Ok(())
}
