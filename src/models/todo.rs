use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Todo {
    pub id: Uuid,
    #[serde(skip)]
    pub username: String,
    pub title: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

// Ids are stored as hyphenated TEXT.
impl<'r> FromRow<'r, SqliteRow> for Todo {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let id = Uuid::parse_str(&id).map_err(|e| sqlx::Error::ColumnDecode {
            index: "id".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id,
            username: row.try_get("username")?,
            title: row.try_get("title")?,
            is_completed: row.try_get("is_completed")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
