mod todo;
mod user;

use std::fmt;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

pub use todo::UpdateTodoParams;
pub use user::CreateUserParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueColumn {
    Username,
    Email,
}

impl UniqueColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueColumn::Username => "username",
            UniqueColumn::Email => "email",
        }
    }
}

impl fmt::Display for UniqueColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("{0} is already taken")]
    UniqueViolation(UniqueColumn),
    #[error("referenced user does not exist")]
    ForeignKeyViolation,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Opens a pool on `source`, which is either a `sqlite:` URL or a file path.
pub async fn connect(source: &str) -> Result<SqlitePool, StoreError> {
    let options = if source.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(source)?
    } else {
        SqliteConnectOptions::new().filename(source)
    }
    .create_if_missing(true)
    .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Users and todos, backed by a shared connection pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}
