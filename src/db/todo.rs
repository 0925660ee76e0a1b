use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::todo::Todo;

const TODO_COLUMNS: &str = "id, username, title, is_completed, created_at";

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTodoParams {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

impl Store {
    /// Inserts a todo and returns the stored row once the insert has committed.
    pub async fn create_todo(
        &self,
        id: Uuid,
        username: &str,
        title: &str,
    ) -> Result<Todo, StoreError> {
        sqlx::query_as::<_, Todo>(&format!(
            "INSERT INTO todos (id, username, title) VALUES (?, ?, ?) RETURNING {TODO_COLUMNS}"
        ))
        .bind(id.to_string())
        .bind(username)
        .bind(title)
        .fetch_all(&self.pool)
        .await
        .and_then(|mut rows| rows.pop().ok_or(sqlx::Error::RowNotFound))
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db_err| db_err.is_foreign_key_violation())
            {
                StoreError::ForeignKeyViolation
            } else {
                e.into()
            }
        })
    }

    pub async fn get_todo_by_id(&self, id: Uuid) -> Result<Todo, StoreError> {
        sqlx::query_as::<_, Todo>(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Oldest first; insertion order breaks ties between equal timestamps.
    pub async fn get_user_todos(
        &self,
        username: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Todo>, StoreError> {
        let todos = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE username = ? \
             ORDER BY created_at, rowid LIMIT ? OFFSET ?"
        ))
        .bind(username)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    /// Applies a partial update in one statement. The statement is drained
    /// with `fetch_all` so it has committed before returning.
    pub async fn update_todo(
        &self,
        id: Uuid,
        params: &UpdateTodoParams,
    ) -> Result<Todo, StoreError> {
        sqlx::query_as::<_, Todo>(&format!(
            "UPDATE todos SET title = COALESCE(?, title), is_completed = COALESCE(?, is_completed) \
             WHERE id = ? RETURNING {TODO_COLUMNS}"
        ))
        .bind(params.title.as_deref())
        .bind(params.is_completed)
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await?
        .pop()
        .ok_or(StoreError::NotFound)
    }

    /// Deletes only when `id` belongs to `username`; anything else is `NotFound`.
    pub async fn delete_todo_of_a_user(&self, id: Uuid, username: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND username = ?")
            .bind(id.to_string())
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
