//! Per-kind record validators
//!
//! Every reference is resolved with the same rule: it is satisfied when the
//! catalog already holds the target, or when the target is a sibling entry of
//! the same batch. The catalog is asked first, so an unreachable store is
//! reported even for references that would resolve in-batch.

use crate::batch::{
    ActorRecord, CustomFieldRecord, CustomValues, ImportBatch, LabelRecord, MovieRecord,
    SceneRecord, StudioRecord,
};
use crate::error::{ResourceField, VerifyError};
use crate::oracle::ExistenceOracle;
use crate::resources::ResourceChecker;
use serde::Serialize;
use vault_common::EntityKind;

/// Counters collected while validating records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    /// References that resolved to a persisted entity
    pub references_in_store: usize,
    /// References that resolved to a sibling in the batch
    pub references_in_batch: usize,
    /// Filesystem resources confirmed to exist
    pub resources_checked: usize,
}

/// Validates records of one batch against the catalog and the filesystem
pub struct RecordValidator<'a> {
    batch: &'a ImportBatch,
    oracle: &'a dyn ExistenceOracle,
    resources: &'a dyn ResourceChecker,
    stats: ValidationStats,
}

impl<'a> RecordValidator<'a> {
    pub fn new(
        batch: &'a ImportBatch,
        oracle: &'a dyn ExistenceOracle,
        resources: &'a dyn ResourceChecker,
    ) -> Self {
        Self {
            batch,
            oracle,
            resources,
            stats: ValidationStats::default(),
        }
    }

    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }

    pub fn into_stats(self) -> ValidationStats {
        self.stats
    }

    /// Validate every record of `kind` in ascending id order, stopping at
    /// the first failure
    pub async fn validate_kind(&mut self, kind: EntityKind) -> Result<(), VerifyError> {
        let batch = self.batch;
        match kind {
            EntityKind::Actor => {
                for (id, record) in &batch.actors {
                    self.validate_actor(id, record).await?;
                }
            }
            EntityKind::Studio => {
                for (id, record) in &batch.studios {
                    self.validate_studio(id, record).await?;
                }
            }
            EntityKind::Scene => {
                for (id, record) in &batch.scenes {
                    self.validate_scene(id, record).await?;
                }
            }
            EntityKind::Movie => {
                for (id, record) in &batch.movies {
                    self.validate_movie(id, record).await?;
                }
            }
            EntityKind::Label => {
                for (id, record) in &batch.labels {
                    self.validate_label(id, record)?;
                }
            }
            EntityKind::CustomField => {
                for (id, record) in &batch.custom_fields {
                    self.validate_custom_field(id, record)?;
                }
            }
        }
        Ok(())
    }

    pub async fn validate_actor(&mut self, id: &str, actor: &ActorRecord) -> Result<(), VerifyError> {
        tracing::trace!(id = %id, "Validating actor");
        let kind = EntityKind::Actor;

        self.optional_resource(kind, id, ResourceField::Thumbnail, actor.thumbnail.as_deref())
            .await?;
        self.resolve_all(kind, id, EntityKind::Label, actor.labels.as_deref())
            .await?;
        self.resolve_custom(kind, id, actor.custom.as_ref()).await
    }

    pub async fn validate_studio(
        &mut self,
        id: &str,
        studio: &StudioRecord,
    ) -> Result<(), VerifyError> {
        tracing::trace!(id = %id, "Validating studio");
        let kind = EntityKind::Studio;

        self.optional_resource(kind, id, ResourceField::Thumbnail, studio.thumbnail.as_deref())
            .await?;
        // A parent may be another new studio of the same batch
        if let Some(parent) = &studio.parent {
            self.resolve(kind, id, EntityKind::Studio, parent).await?;
        }
        Ok(())
    }

    pub async fn validate_scene(&mut self, id: &str, scene: &SceneRecord) -> Result<(), VerifyError> {
        tracing::trace!(id = %id, "Validating scene");
        let kind = EntityKind::Scene;

        self.required_resource(kind, id, ResourceField::Video, scene.path.as_deref())
            .await?;
        self.optional_resource(kind, id, ResourceField::Thumbnail, scene.thumbnail.as_deref())
            .await?;
        self.resolve_all(kind, id, EntityKind::Label, scene.labels.as_deref())
            .await?;
        self.resolve_custom(kind, id, scene.custom.as_ref()).await?;
        self.resolve_all(kind, id, EntityKind::Actor, scene.actors.as_deref())
            .await?;
        if let Some(studio) = &scene.studio {
            self.resolve(kind, id, EntityKind::Studio, studio).await?;
        }
        Ok(())
    }

    pub async fn validate_movie(&mut self, id: &str, movie: &MovieRecord) -> Result<(), VerifyError> {
        tracing::trace!(id = %id, "Validating movie");
        let kind = EntityKind::Movie;

        self.optional_resource(kind, id, ResourceField::FrontCover, movie.front_cover.as_deref())
            .await?;
        self.optional_resource(kind, id, ResourceField::BackCover, movie.back_cover.as_deref())
            .await?;
        self.resolve_all(kind, id, EntityKind::Label, movie.labels.as_deref())
            .await?;
        self.resolve_custom(kind, id, movie.custom.as_ref()).await?;
        self.resolve_all(kind, id, EntityKind::Scene, movie.scenes.as_deref())
            .await?;
        if let Some(studio) = &movie.studio {
            self.resolve(kind, id, EntityKind::Studio, studio).await?;
        }
        Ok(())
    }

    /// Labels carry no references or resources; freshness of their ids is
    /// covered by the duplicate check.
    pub fn validate_label(&mut self, _id: &str, _label: &LabelRecord) -> Result<(), VerifyError> {
        Ok(())
    }

    /// Same as labels: nothing beyond the duplicate check.
    pub fn validate_custom_field(
        &mut self,
        _id: &str,
        _field: &CustomFieldRecord,
    ) -> Result<(), VerifyError> {
        Ok(())
    }

    async fn resolve(
        &mut self,
        from_kind: EntityKind,
        from_id: &str,
        to_kind: EntityKind,
        to_id: &str,
    ) -> Result<(), VerifyError> {
        let in_store = self
            .oracle
            .exists(to_kind, to_id)
            .await
            .map_err(|source| VerifyError::StoreUnavailable {
                kind: to_kind,
                id: to_id.to_string(),
                source,
            })?;
        if in_store {
            self.stats.references_in_store += 1;
            return Ok(());
        }

        if self.batch.contains(to_kind, to_id) {
            self.stats.references_in_batch += 1;
            return Ok(());
        }

        Err(VerifyError::MissingReference {
            from_kind,
            from_id: from_id.to_string(),
            to_kind,
            to_id: to_id.to_string(),
        })
    }

    async fn resolve_all(
        &mut self,
        from_kind: EntityKind,
        from_id: &str,
        to_kind: EntityKind,
        refs: Option<&[String]>,
    ) -> Result<(), VerifyError> {
        for to_id in refs.unwrap_or_default() {
            self.resolve(from_kind, from_id, to_kind, to_id).await?;
        }
        Ok(())
    }

    /// Custom values are keyed by custom field id
    async fn resolve_custom(
        &mut self,
        from_kind: EntityKind,
        from_id: &str,
        custom: Option<&CustomValues>,
    ) -> Result<(), VerifyError> {
        if let Some(custom) = custom {
            for field_id in custom.keys() {
                self.resolve(from_kind, from_id, EntityKind::CustomField, field_id)
                    .await?;
            }
        }
        Ok(())
    }

    async fn required_resource(
        &mut self,
        kind: EntityKind,
        id: &str,
        field: ResourceField,
        path: Option<&str>,
    ) -> Result<(), VerifyError> {
        let missing = || VerifyError::MissingResource {
            kind,
            id: id.to_string(),
            field,
        };
        let path = path.ok_or_else(missing)?;

        if !self.resources.exists(path).await {
            tracing::debug!(kind = %kind, id = %id, field = %field, path = %path, "Resource not found");
            return Err(missing());
        }
        self.stats.resources_checked += 1;
        Ok(())
    }

    async fn optional_resource(
        &mut self,
        kind: EntityKind,
        id: &str,
        field: ResourceField,
        path: Option<&str>,
    ) -> Result<(), VerifyError> {
        match path {
            Some(_) => self.required_resource(kind, id, field, path).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryOracle, InMemoryResources};

    fn ids(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|v| v.to_string()).collect())
    }

    #[tokio::test]
    async fn test_actor_label_resolves_in_store_or_batch() {
        let mut batch = ImportBatch::default();
        batch.labels.insert("new-label".to_string(), LabelRecord::default());
        let oracle = InMemoryOracle::new().with_entity(EntityKind::Label, "old-label");
        let resources = InMemoryResources::new();

        let actor = ActorRecord {
            labels: ids(&["old-label", "new-label"]),
            ..Default::default()
        };
        let mut validator = RecordValidator::new(&batch, &oracle, &resources);
        validator.validate_actor("a1", &actor).await.unwrap();

        assert_eq!(validator.stats().references_in_store, 1);
        assert_eq!(validator.stats().references_in_batch, 1);
    }

    #[tokio::test]
    async fn test_actor_unknown_custom_field() {
        let batch = ImportBatch::default();
        let oracle = InMemoryOracle::new();
        let resources = InMemoryResources::new();

        let mut custom = CustomValues::new();
        custom.insert("cf-height".to_string(), serde_json::json!(172));
        let actor = ActorRecord {
            custom: Some(custom),
            ..Default::default()
        };

        let err = RecordValidator::new(&batch, &oracle, &resources)
            .validate_actor("a1", &actor)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            VerifyError::MissingReference {
                from_kind: EntityKind::Actor,
                from_id: "a1".to_string(),
                to_kind: EntityKind::CustomField,
                to_id: "cf-height".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_actor_thumbnail_checked_before_references() {
        let batch = ImportBatch::default();
        let oracle = InMemoryOracle::new();
        let resources = InMemoryResources::new();

        let actor = ActorRecord {
            thumbnail: Some("/thumbs/a1.jpg".to_string()),
            labels: ids(&["missing"]),
            ..Default::default()
        };
        let err = RecordValidator::new(&batch, &oracle, &resources)
            .validate_actor("a1", &actor)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VerifyError::MissingResource { field: ResourceField::Thumbnail, .. }
        ));
        assert_eq!(oracle.lookups(), 0);
    }

    #[tokio::test]
    async fn test_scene_without_path_is_missing_video() {
        let batch = ImportBatch::default();
        let oracle = InMemoryOracle::new();
        let resources = InMemoryResources::new();

        let err = RecordValidator::new(&batch, &oracle, &resources)
            .validate_scene("sc1", &SceneRecord::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            VerifyError::MissingResource {
                kind: EntityKind::Scene,
                id: "sc1".to_string(),
                field: ResourceField::Video,
            }
        );
        // Absence of the field is decided without touching the filesystem
        assert_eq!(resources.checks(), 0);
    }

    #[tokio::test]
    async fn test_scene_references_studio_and_actors() {
        let mut batch = ImportBatch::default();
        batch.actors.insert("a1".to_string(), ActorRecord::default());
        let oracle = InMemoryOracle::new();
        let resources = InMemoryResources::new().with_path("/v/sc1.mp4");

        let scene = SceneRecord {
            path: Some("/v/sc1.mp4".to_string()),
            actors: ids(&["a1"]),
            studio: Some("st-missing".to_string()),
            ..Default::default()
        };
        let err = RecordValidator::new(&batch, &oracle, &resources)
            .validate_scene("sc1", &scene)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            VerifyError::MissingReference {
                from_kind: EntityKind::Scene,
                from_id: "sc1".to_string(),
                to_kind: EntityKind::Studio,
                to_id: "st-missing".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_movie_back_cover_named_on_failure() {
        let batch = ImportBatch::default();
        let oracle = InMemoryOracle::new();
        let resources = InMemoryResources::new().with_path("/covers/front.jpg");

        let movie = MovieRecord {
            front_cover: Some("/covers/front.jpg".to_string()),
            back_cover: Some("/covers/back.jpg".to_string()),
            ..Default::default()
        };
        let err = RecordValidator::new(&batch, &oracle, &resources)
            .validate_movie("mv1", &movie)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            VerifyError::MissingResource {
                kind: EntityKind::Movie,
                id: "mv1".to_string(),
                field: ResourceField::BackCover,
            }
        );
    }

    #[tokio::test]
    async fn test_movie_scene_in_store() {
        let batch = ImportBatch::default();
        let oracle = InMemoryOracle::new().with_entity(EntityKind::Scene, "sc-old");
        let resources = InMemoryResources::new();

        let movie = MovieRecord {
            scenes: ids(&["sc-old"]),
            ..Default::default()
        };
        let mut validator = RecordValidator::new(&batch, &oracle, &resources);
        validator.validate_movie("mv1", &movie).await.unwrap();
        assert_eq!(validator.into_stats().references_in_store, 1);
    }

    #[tokio::test]
    async fn test_store_failure_not_masked_by_batch_sibling() {
        let mut batch = ImportBatch::default();
        batch.studios.insert("st0".to_string(), StudioRecord::default());
        let oracle = InMemoryOracle::unavailable("timeout");
        let resources = InMemoryResources::new();

        let studio = StudioRecord {
            parent: Some("st0".to_string()),
            ..Default::default()
        };
        let err = RecordValidator::new(&batch, &oracle, &resources)
            .validate_studio("st1", &studio)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::StoreUnavailable { kind: EntityKind::Studio, .. }));
    }

    #[tokio::test]
    async fn test_labels_and_custom_fields_are_no_ops() {
        let mut batch = ImportBatch::default();
        batch.labels.insert("lb1".to_string(), LabelRecord::default());
        batch
            .custom_fields
            .insert("cf1".to_string(), CustomFieldRecord::default());
        let oracle = InMemoryOracle::new();
        let resources = InMemoryResources::new();

        let mut validator = RecordValidator::new(&batch, &oracle, &resources);
        validator.validate_kind(EntityKind::Label).await.unwrap();
        validator.validate_kind(EntityKind::CustomField).await.unwrap();
        assert_eq!(oracle.lookups(), 0);
        assert_eq!(resources.checks(), 0);
    }
}
