use super::{Store, StoreError, UniqueColumn};
use crate::models::user::User;

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub hashed_password: String,
}

impl Store {
    // `RETURNING` statements are drained with `fetch_all` so the insert has
    // committed before the row is handed back.
    pub async fn create_user(&self, params: &CreateUserParams) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, full_name, hashed_password) VALUES (?, ?, ?, ?) \
             RETURNING username, email, full_name, hashed_password, created_at",
        )
        .bind(&params.username)
        .bind(&params.email)
        .bind(&params.full_name)
        .bind(&params.hashed_password)
        .fetch_all(&self.pool)
        .await
        .and_then(|mut rows| rows.pop().ok_or(sqlx::Error::RowNotFound));

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                match self.colliding_column(&params.username, &params.email).await? {
                    Some(column) => Err(StoreError::UniqueViolation(column)),
                    None => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user(&self, username: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT username, email, full_name, hashed_password, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Finds which unique column an existing row shares with the candidate.
    async fn colliding_column(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<UniqueColumn>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT username, email FROM users WHERE username = ? OR email = ?",
        )
        .bind(username)
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        if rows.iter().any(|(existing, _)| existing == username) {
            return Ok(Some(UniqueColumn::Username));
        }
        if rows.iter().any(|(_, existing)| existing == email) {
            return Ok(Some(UniqueColumn::Email));
        }
        Ok(None)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}
