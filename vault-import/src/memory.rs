//! In-memory oracle and resource checker
//!
//! Deterministic stand-ins for the catalog and the filesystem, used by the
//! test suites and for dry runs against a hand-written snapshot.

use crate::error::StoreUnavailable;
use crate::oracle::ExistenceOracle;
use crate::resources::ResourceChecker;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use vault_common::EntityKind;

/// Fixed set of persisted (kind, id) pairs
#[derive(Debug, Default)]
pub struct InMemoryOracle {
    entities: HashSet<(EntityKind, String)>,
    unavailable: Option<String>,
    lookups: AtomicUsize,
}

impl InMemoryOracle {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog that fails every lookup with `reason`
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn with_entity(mut self, kind: EntityKind, id: impl Into<String>) -> Self {
        self.insert(kind, id);
        self
    }

    pub fn insert(&mut self, kind: EntityKind, id: impl Into<String>) {
        self.entities.insert((kind, id.into()));
    }

    /// Lookups answered (or failed) so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ExistenceOracle for InMemoryOracle {
    async fn exists(&self, kind: EntityKind, id: &str) -> Result<bool, StoreUnavailable> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if let Some(reason) = &self.unavailable {
            return Err(StoreUnavailable::new(reason.clone()));
        }
        Ok(self.entities.contains(&(kind, id.to_string())))
    }
}

/// Fixed set of existing resource paths
#[derive(Debug, Default)]
pub struct InMemoryResources {
    paths: HashSet<String>,
    checks: AtomicUsize,
}

impl InMemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.insert(path.into());
        self
    }

    /// Resource checks made so far
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ResourceChecker for InMemoryResources {
    async fn exists(&self, path: &str) -> bool {
        self.checks.fetch_add(1, Ordering::Relaxed);
        self.paths.contains(path)
    }
}
