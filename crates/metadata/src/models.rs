//! Database models mapping to the metadata schema.

use serde::Serialize;
use sqlx::FromRow;

/// A row of the `images` table.
///
/// `filepath` is only set by folder population; records created through the
/// API or by initialization carry the filename alone.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct ImageRow {
    pub id: i64,
    pub filename: String,
    pub filepath: Option<String>,
}

/// Summary of a record inserted during a folder sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedImage {
    pub id: i64,
    pub filename: String,
}

impl From<&ImageRow> for AddedImage {
    fn from(row: &ImageRow) -> Self {
        Self {
            id: row.id,
            filename: row.filename.clone(),
        }
    }
}
