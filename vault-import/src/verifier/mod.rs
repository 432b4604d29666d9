//! Batch verifier
//!
//! Certifies an [`ImportBatch`] before anything is written:
//!
//! ```text
//! Pending -> DuplicateChecking -> ValidatingActors -> ValidatingStudios
//!         -> ValidatingScenes -> ValidatingMovies -> Accepted
//! ```
//!
//! Any stage may end in a [`Rejection`] carrying the first error found.
//! Verification is fail-fast across the whole pipeline and never accepts a
//! batch partially. Acceptance is a point-in-time certification: the
//! catalog and the filesystem may change before the batch is persisted.

pub mod duplicates;
pub mod validators;

pub use duplicates::{check_no_duplicates, DUPLICATE_CHECK_ORDER};
pub use validators::{RecordValidator, ValidationStats};

use crate::batch::ImportBatch;
use crate::error::VerifyError;
use crate::oracle::ExistenceOracle;
use crate::resources::ResourceChecker;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};
use vault_common::EntityKind;

/// Verification state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStage {
    Pending,
    DuplicateChecking,
    ValidatingActors,
    ValidatingStudios,
    ValidatingScenes,
    ValidatingMovies,
    Accepted,
}

impl VerificationStage {
    /// Stage reached after this one completes successfully
    pub fn next(self) -> Option<VerificationStage> {
        use VerificationStage::*;
        match self {
            Pending => Some(DuplicateChecking),
            DuplicateChecking => Some(ValidatingActors),
            ValidatingActors => Some(ValidatingStudios),
            ValidatingStudios => Some(ValidatingScenes),
            ValidatingScenes => Some(ValidatingMovies),
            ValidatingMovies => Some(Accepted),
            Accepted => None,
        }
    }

    /// Entity kind validated in this stage, if it is a validation stage
    pub fn validated_kind(self) -> Option<EntityKind> {
        match self {
            VerificationStage::ValidatingActors => Some(EntityKind::Actor),
            VerificationStage::ValidatingStudios => Some(EntityKind::Studio),
            VerificationStage::ValidatingScenes => Some(EntityKind::Scene),
            VerificationStage::ValidatingMovies => Some(EntityKind::Movie),
            _ => None,
        }
    }
}

impl fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerificationStage::Pending => "pending",
            VerificationStage::DuplicateChecking => "duplicate check",
            VerificationStage::ValidatingActors => "actor validation",
            VerificationStage::ValidatingStudios => "studio validation",
            VerificationStage::ValidatingScenes => "scene validation",
            VerificationStage::ValidatingMovies => "movie validation",
            VerificationStage::Accepted => "accepted",
        };
        f.write_str(name)
    }
}

/// Batch rejected: the stage that failed and the first error it found
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("import batch rejected during {stage}: {error}")]
pub struct Rejection {
    pub stage: VerificationStage,
    #[source]
    pub error: VerifyError,
}

/// Summary of an accepted batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// Entities per kind in the accepted batch
    pub entities: BTreeMap<EntityKind, usize>,
    /// Catalog lookups made by the duplicate check
    pub duplicate_lookups: usize,
    pub validation: ValidationStats,
}

impl VerificationReport {
    pub fn total_entities(&self) -> usize {
        self.entities.values().sum()
    }
}

/// Runs the verification protocol over one batch
///
/// Holds no state between calls; the same batch against an unchanged catalog
/// and filesystem always yields the same result.
pub struct BatchVerifier<'a> {
    oracle: &'a dyn ExistenceOracle,
    resources: &'a dyn ResourceChecker,
}

impl<'a> BatchVerifier<'a> {
    pub fn new(oracle: &'a dyn ExistenceOracle, resources: &'a dyn ResourceChecker) -> Self {
        Self { oracle, resources }
    }

    pub async fn verify(&self, batch: &ImportBatch) -> Result<VerificationReport, Rejection> {
        info!(entities = batch.total(), "Verifying import batch");

        let mut validator = RecordValidator::new(batch, self.oracle, self.resources);
        let mut duplicate_lookups = 0;
        let mut stage = VerificationStage::Pending;

        while let Some(next) = stage.next() {
            stage = next;
            debug!(stage = %stage, "Verification stage");

            let outcome = match stage {
                VerificationStage::DuplicateChecking => check_no_duplicates(batch, self.oracle)
                    .await
                    .map(|lookups| duplicate_lookups = lookups),
                VerificationStage::Accepted | VerificationStage::Pending => Ok(()),
                validating => match validating.validated_kind() {
                    Some(kind) => validator.validate_kind(kind).await,
                    None => Ok(()),
                },
            };

            if let Err(error) = outcome {
                warn!(stage = %stage, error = %error, "Import batch rejected");
                return Err(Rejection { stage, error });
            }
        }

        let entities = EntityKind::ALL
            .iter()
            .map(|&kind| (kind, batch.len(kind)))
            .collect();
        let report = VerificationReport {
            entities,
            duplicate_lookups,
            validation: validator.into_stats(),
        };

        info!(
            entities = report.total_entities(),
            references_in_store = report.validation.references_in_store,
            references_in_batch = report.validation.references_in_batch,
            resources = report.validation.resources_checked,
            "Import batch accepted"
        );
        Ok(report)
    }
}
