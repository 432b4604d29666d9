//! Identifier freshness: no batch id may already exist in the catalog

use crate::batch::ImportBatch;
use crate::error::VerifyError;
use crate::oracle::ExistenceOracle;
use vault_common::EntityKind;

/// Order in which kinds are scanned for collisions
///
/// Only decides which duplicate is reported when there are several.
pub const DUPLICATE_CHECK_ORDER: [EntityKind; 6] = [
    EntityKind::Actor,
    EntityKind::CustomField,
    EntityKind::Label,
    EntityKind::Movie,
    EntityKind::Scene,
    EntityKind::Studio,
];

/// Reject the batch on the first id that is already persisted
///
/// Returns the number of lookups made when no collision is found.
pub async fn check_no_duplicates(
    batch: &ImportBatch,
    oracle: &dyn ExistenceOracle,
) -> Result<usize, VerifyError> {
    let mut lookups = 0;

    for kind in DUPLICATE_CHECK_ORDER {
        for id in batch.ids(kind) {
            lookups += 1;
            let exists = oracle
                .exists(kind, id)
                .await
                .map_err(|source| VerifyError::StoreUnavailable {
                    kind,
                    id: id.to_string(),
                    source,
                })?;

            if exists {
                tracing::debug!(kind = %kind, id = %id, "Batch id already in catalog");
                return Err(VerifyError::Duplicate {
                    kind,
                    id: id.to_string(),
                });
            }
        }
    }

    Ok(lookups)
}
