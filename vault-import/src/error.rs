//! Verification errors
//!
//! A closed set of structured failures. Every variant names the offending
//! entity so that the upstream import data can be fixed without re-running
//! verification to find out what went wrong.

use std::fmt;
use thiserror::Error;
use vault_common::EntityKind;

/// The backing store could not answer an existence lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("catalog store unavailable: {reason}")]
pub struct StoreUnavailable {
    pub reason: String,
}

impl StoreUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Filesystem-backed field of an entity record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceField {
    /// Scene video file (mandatory)
    Video,
    Thumbnail,
    FrontCover,
    BackCover,
}

impl ResourceField {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceField::Video => "video",
            ResourceField::Thumbnail => "thumbnail",
            ResourceField::FrontCover => "frontCover",
            ResourceField::BackCover => "backCover",
        }
    }
}

impl fmt::Display for ResourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an import batch was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// A proposed id already exists in the catalog
    #[error("{kind} {id} already exists")]
    Duplicate { kind: EntityKind, id: String },

    /// A reference resolves neither in the catalog nor in the batch
    #[error("{from_kind} {from_id} references {to_kind} {to_id}, which does not exist")]
    MissingReference {
        from_kind: EntityKind,
        from_id: String,
        to_kind: EntityKind,
        to_id: String,
    },

    /// A claimed file does not exist or cannot be read
    #[error("{kind} {id} {field} does not exist")]
    MissingResource {
        kind: EntityKind,
        id: String,
        field: ResourceField,
    },

    /// The catalog could not answer a lookup for (kind, id)
    #[error("lookup of {kind} {id} failed")]
    StoreUnavailable {
        kind: EntityKind,
        id: String,
        #[source]
        source: StoreUnavailable,
    },
}
