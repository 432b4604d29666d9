//! Existence lookups against the catalog

use crate::{EntityKind, Result};
use sqlx::SqlitePool;

/// Whether an entity of `kind` with `id` is persisted in the catalog
pub async fn entity_exists(pool: &SqlitePool, kind: EntityKind, id: &str) -> Result<bool> {
    // Table names come from a closed enum, never from input
    let sql = format!("SELECT 1 FROM {} WHERE id = ? LIMIT 1", kind.table_name());
    let row: Option<(i64,)> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.is_some())
}

/// Number of persisted entities of `kind`
pub async fn count_entities(pool: &SqlitePool, kind: EntityKind) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", kind.table_name());
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(count)
}
