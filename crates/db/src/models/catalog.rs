use questline_core::catalog::CatalogEntry;
use sqlx::FromRow;

/// A row from the `reference_catalog` table.
#[derive(Debug, Clone, FromRow)]
pub struct CatalogRow {
    pub kind: String,
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
}

impl From<CatalogRow> for CatalogEntry {
    fn from(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            icon: row.icon,
        }
    }
}
