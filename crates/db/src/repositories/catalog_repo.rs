//! Repository for the read-only `reference_catalog` table.

use questline_core::catalog::CatalogKind;
use sqlx::PgPool;

use crate::models::catalog::CatalogRow;

pub struct CatalogRepo;

impl CatalogRepo {
    pub async fn list(pool: &PgPool, kind: CatalogKind) -> Result<Vec<CatalogRow>, sqlx::Error> {
        sqlx::query_as::<_, CatalogRow>(
            "SELECT kind, id, name, icon FROM reference_catalog
             WHERE kind = $1
             ORDER BY name",
        )
        .bind(kind.as_str())
        .fetch_all(pool)
        .await
    }
}
