//! Entity kinds stored in the catalog

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six kinds of catalog entity
///
/// Identity of a catalog entity is always the pair `(kind, id)`: the same id
/// string may legitimately be used by two different kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Actor,
    Movie,
    Scene,
    Studio,
    Label,
    CustomField,
}

impl EntityKind {
    /// All kinds, in declaration order
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Actor,
        EntityKind::Movie,
        EntityKind::Scene,
        EntityKind::Studio,
        EntityKind::Label,
        EntityKind::CustomField,
    ];

    /// Catalog table holding entities of this kind
    pub fn table_name(self) -> &'static str {
        match self {
            EntityKind::Actor => "actors",
            EntityKind::Movie => "movies",
            EntityKind::Scene => "scenes",
            EntityKind::Studio => "studios",
            EntityKind::Label => "labels",
            EntityKind::CustomField => "custom_fields",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Actor => "Actor",
            EntityKind::Movie => "Movie",
            EntityKind::Scene => "Scene",
            EntityKind::Studio => "Studio",
            EntityKind::Label => "Label",
            EntityKind::CustomField => "Custom field",
        };
        f.write_str(name)
    }
}
