//! Import batch model
//!
//! An [`ImportBatch`] is what the import-parsing stage hands to the verifier:
//! for each entity kind, a mapping from batch-local id to a partial record.
//! Only the fields the verifier inspects carry semantics here; the rest are
//! carried through for the persistence stage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use vault_common::EntityKind;

/// Custom field values keyed by custom field id
pub type CustomValues = BTreeMap<String, Value>;

/// Partial actor record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActorRecord {
    pub name: Option<String>,
    pub aliases: Option<Vec<String>>,
    pub description: Option<String>,
    pub rating: Option<i64>,
    pub favorite: Option<bool>,
    pub bookmark: Option<i64>,
    pub born_on: Option<i64>,
    pub thumbnail: Option<String>,
    pub labels: Option<Vec<String>>,
    pub custom: Option<CustomValues>,
}

/// Partial movie record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovieRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub rating: Option<i64>,
    pub favorite: Option<bool>,
    pub bookmark: Option<i64>,
    pub release_date: Option<i64>,
    pub front_cover: Option<String>,
    pub back_cover: Option<String>,
    pub labels: Option<Vec<String>>,
    pub custom: Option<CustomValues>,
    pub scenes: Option<Vec<String>>,
    pub studio: Option<String>,
}

/// Partial scene record
///
/// `path` is mandatory for a scene but modelled as optional so that a record
/// without it can be reported instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub rating: Option<i64>,
    pub favorite: Option<bool>,
    pub bookmark: Option<i64>,
    pub release_date: Option<i64>,
    pub path: Option<String>,
    pub thumbnail: Option<String>,
    pub labels: Option<Vec<String>>,
    pub custom: Option<CustomValues>,
    pub actors: Option<Vec<String>>,
    pub studio: Option<String>,
}

/// Partial studio record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudioRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub parent: Option<String>,
}

/// Partial label record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelRecord {
    pub name: Option<String>,
    pub aliases: Option<Vec<String>>,
}

/// Partial custom field record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomFieldRecord {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub values: Option<Vec<String>>,
}

/// A bulk submission of new entities awaiting verification
///
/// Mappings are ordered by id, which makes the verification order (and so the
/// first reported error) deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportBatch {
    pub actors: BTreeMap<String, ActorRecord>,
    pub movies: BTreeMap<String, MovieRecord>,
    pub scenes: BTreeMap<String, SceneRecord>,
    pub studios: BTreeMap<String, StudioRecord>,
    pub labels: BTreeMap<String, LabelRecord>,
    pub custom_fields: BTreeMap<String, CustomFieldRecord>,
}

impl ImportBatch {
    /// Parse a batch from JSON text
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Read and parse a batch file
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read import batch {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid import batch {}", path.display()))
    }

    /// Whether `id` is a key of the mapping for `kind`
    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Actor => self.actors.contains_key(id),
            EntityKind::Movie => self.movies.contains_key(id),
            EntityKind::Scene => self.scenes.contains_key(id),
            EntityKind::Studio => self.studios.contains_key(id),
            EntityKind::Label => self.labels.contains_key(id),
            EntityKind::CustomField => self.custom_fields.contains_key(id),
        }
    }

    /// Ids of `kind` in ascending order
    pub fn ids(&self, kind: EntityKind) -> Box<dyn Iterator<Item = &str> + Send + '_> {
        match kind {
            EntityKind::Actor => Box::new(self.actors.keys().map(String::as_str)),
            EntityKind::Movie => Box::new(self.movies.keys().map(String::as_str)),
            EntityKind::Scene => Box::new(self.scenes.keys().map(String::as_str)),
            EntityKind::Studio => Box::new(self.studios.keys().map(String::as_str)),
            EntityKind::Label => Box::new(self.labels.keys().map(String::as_str)),
            EntityKind::CustomField => Box::new(self.custom_fields.keys().map(String::as_str)),
        }
    }

    /// Number of entities of `kind` in the batch
    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Actor => self.actors.len(),
            EntityKind::Movie => self.movies.len(),
            EntityKind::Scene => self.scenes.len(),
            EntityKind::Studio => self.studios.len(),
            EntityKind::Label => self.labels.len(),
            EntityKind::CustomField => self.custom_fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|&kind| self.len(kind) == 0)
    }

    /// Total number of entities across all kinds
    pub fn total(&self) -> usize {
        EntityKind::ALL.iter().map(|&kind| self.len(kind)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_batch() {
        let batch = ImportBatch::from_json_str(
            r#"{
                "movies": {
                    "mv1": { "frontCover": "/covers/front.jpg", "scenes": ["sc1"], "studio": "st1" }
                },
                "scenes": { "sc1": { "path": "/videos/sc1.mp4", "releaseDate": 1577836800000 } },
                "customFields": { "cf1": { "name": "Hair color", "type": "SELECT", "values": ["Red"] } }
            }"#,
        )
        .unwrap();

        let movie = &batch.movies["mv1"];
        assert_eq!(movie.front_cover.as_deref(), Some("/covers/front.jpg"));
        assert_eq!(movie.scenes.as_deref(), Some(&["sc1".to_string()][..]));
        assert_eq!(batch.scenes["sc1"].release_date, Some(1577836800000));
        assert_eq!(batch.custom_fields["cf1"].field_type.as_deref(), Some("SELECT"));
        assert!(batch.actors.is_empty());
    }

    #[test]
    fn test_empty_object_is_empty_batch() {
        let batch = ImportBatch::from_json_str("{}").unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.total(), 0);
    }

    #[test]
    fn test_contains_is_per_kind() {
        let mut batch = ImportBatch::default();
        batch.labels.insert("x".to_string(), LabelRecord::default());

        assert!(batch.contains(EntityKind::Label, "x"));
        assert!(!batch.contains(EntityKind::CustomField, "x"));
        assert!(!batch.contains(EntityKind::Label, "y"));
    }

    #[test]
    fn test_ids_are_sorted() {
        let mut batch = ImportBatch::default();
        for id in ["s2", "s10", "s1"] {
            batch.studios.insert(id.to_string(), StudioRecord::default());
        }
        let ids: Vec<_> = batch.ids(EntityKind::Studio).collect();
        assert_eq!(ids, vec!["s1", "s10", "s2"]);
        assert_eq!(batch.len(EntityKind::Studio), 3);
    }

    #[test]
    fn test_custom_values_keep_json() {
        let batch = ImportBatch::from_json_str(
            r#"{ "actors": { "a1": { "custom": { "cf2": 170, "cf1": ["x", "y"] } } } }"#,
        )
        .unwrap();
        let custom = batch.actors["a1"].custom.as_ref().unwrap();
        let keys: Vec<_> = custom.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["cf1", "cf2"]);
        assert_eq!(custom["cf2"], serde_json::json!(170));
    }

    #[test]
    fn test_out_of_range_pass_through_fields_still_parse() {
        let batch = ImportBatch::from_json_str(
            r#"{
                "actors": { "a1": { "rating": -1 } },
                "movies": { "mv1": { "rating": 300 } },
                "scenes": { "sc1": { "path": "/v.mp4", "rating": 10 } }
            }"#,
        )
        .unwrap();
        assert_eq!(batch.actors["a1"].rating, Some(-1));
        assert_eq!(batch.movies["mv1"].rating, Some(300));
        assert_eq!(batch.scenes["sc1"].rating, Some(10));
    }
}
