use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}
