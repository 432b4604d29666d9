//! Existence oracle: "does an entity of kind K with id X exist in the catalog?"

use crate::error::StoreUnavailable;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use vault_common::db::entity_exists;
use vault_common::EntityKind;

/// Default deadline for one catalog lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Answers whether an entity is already persisted
///
/// Implementations must have no side effects and must report an unreachable
/// store as [`StoreUnavailable`], never as "does not exist".
#[async_trait]
pub trait ExistenceOracle: Send + Sync {
    async fn exists(&self, kind: EntityKind, id: &str) -> Result<bool, StoreUnavailable>;
}

/// Oracle backed by the SQLite catalog
pub struct SqliteOracle {
    pool: SqlitePool,
    lookup_timeout: Duration,
}

impl SqliteOracle {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Bound every lookup; an expired deadline is reported as unavailable
    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }
}

#[async_trait]
impl ExistenceOracle for SqliteOracle {
    async fn exists(&self, kind: EntityKind, id: &str) -> Result<bool, StoreUnavailable> {
        match tokio::time::timeout(self.lookup_timeout, entity_exists(&self.pool, kind, id)).await {
            Ok(Ok(found)) => Ok(found),
            Ok(Err(e)) => {
                tracing::debug!(kind = %kind, id = %id, error = %e, "Catalog lookup failed");
                Err(StoreUnavailable::new(e.to_string()))
            }
            Err(_) => Err(StoreUnavailable::new(format!(
                "lookup timed out after {} ms",
                self.lookup_timeout.as_millis()
            ))),
        }
    }
}

/// Caches answers of another oracle per (kind, id)
///
/// Only successful answers are cached; a failed lookup is retried on the next
/// call. The cache lives as long as the wrapper, so wrap a fresh oracle per
/// verification run if answers must reflect the current catalog.
pub struct MemoizedOracle<O> {
    inner: O,
    cache: Mutex<HashMap<(EntityKind, String), bool>>,
}

impl<O: ExistenceOracle> MemoizedOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached answers
    pub fn cached(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

#[async_trait]
impl<O: ExistenceOracle> ExistenceOracle for MemoizedOracle<O> {
    async fn exists(&self, kind: EntityKind, id: &str) -> Result<bool, StoreUnavailable> {
        let key = (kind, id.to_string());
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied();
        if let Some(found) = cached {
            return Ok(found);
        }

        let found = self.inner.exists(kind, id).await?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, found);
        Ok(found)
    }
}
