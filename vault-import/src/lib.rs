//! # Media Vault bulk-import verifier
//!
//! Certifies that an import batch of actors, movies, scenes, studios, labels
//! and custom fields can be merged into the catalog: no id collides with a
//! persisted entity, every reference resolves (in the catalog or within the
//! batch) and every claimed file exists. Nothing is written.

pub mod batch;
pub mod cli;
pub mod error;
pub mod memory;
pub mod oracle;
pub mod resources;
pub mod verifier;

pub use batch::ImportBatch;
pub use error::{ResourceField, StoreUnavailable, VerifyError};
pub use oracle::{ExistenceOracle, MemoizedOracle, SqliteOracle};
pub use resources::{FsResourceChecker, ResourceChecker};
pub use verifier::{BatchVerifier, Rejection, VerificationReport, VerificationStage};
