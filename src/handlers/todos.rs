use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use super::ACCOUNT_NOT_FOUND_MESSAGE;
use crate::{
    db::{StoreError, UpdateTodoParams},
    error::{AppError, Result},
    extract::{JsonBody, QueryParams},
    middleware::AuthUser,
    models::todo::Todo,
    response::ApiResponse,
    validation::{Field, Rule, Validate, Value},
    AppState,
};

pub const DEFAULT_PAGE_NUM: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 5;

const INVALID_ID_MESSAGE: &str = "Invalid todo identifier";
const INVALID_PAGE_MESSAGE: &str = "Page number and page size must be greater than zero";
const TODO_NOT_FOUND_MESSAGE: &str = "Oops!! We couldn't find the associated todo";
const OWNED_TODO_NOT_FOUND_MESSAGE: &str =
    "Oops!! We couldn't find any of your todos with the given identifier";
const FORBIDDEN_MESSAGE: &str = "You are forbidden to perform the action on this resource";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTodoRequest {
    pub title: String,
}

impl Validate for CreateTodoRequest {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::new(
            "title",
            Value::Str(Some(&self.title)),
            &[Rule::Required, Rule::Min(6), Rule::Max(255)],
        )]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

impl Validate for UpdateTodoRequest {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new(
                "title",
                Value::Str(self.title.as_deref()),
                &[Rule::Min(6), Rule::Max(255)],
            ),
            Field::new("is_completed", Value::Bool(self.is_completed), &[]),
        ]
    }
}

/// Raw query values; anything unparseable falls back to the default.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page_num: Option<String>,
    pub page_size: Option<String>,
}

impl PageQuery {
    /// Returns `(limit, offset)` for a 1-based page.
    fn limit_offset(&self) -> Result<(i64, i64)> {
        let parse = |raw: &Option<String>, default: i64| {
            raw.as_deref()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or(default)
        };
        let page_num = parse(&self.page_num, DEFAULT_PAGE_NUM);
        let page_size = parse(&self.page_size, DEFAULT_PAGE_SIZE);

        if page_num <= 0 || page_size <= 0 {
            return Err(AppError::BadRequest(INVALID_PAGE_MESSAGE.to_string()));
        }

        Ok((page_size, (page_num - 1).saturating_mul(page_size)))
    }
}

fn parse_todo_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(INVALID_ID_MESSAGE.to_string()))
}

fn todo_not_found(message: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |e| match e {
        StoreError::NotFound => AppError::NotFound(message.to_string()),
        other => other.into(),
    }
}

/// POST /api/v1/todos
#[tracing::instrument(skip_all, fields(username = %auth.username))]
pub async fn create_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<CreateTodoRequest>,
) -> Result<ApiResponse<Todo>> {
    state.validator.validate(&req)?;

    let todo = state
        .store
        .create_todo(Uuid::new_v4(), &auth.username, &req.title)
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation => {
                AppError::NotFound(ACCOUNT_NOT_FOUND_MESSAGE.to_string())
            }
            other => other.into(),
        })?;

    tracing::debug!(todo_id = %todo.id, "created todo");
    Ok(ApiResponse(todo))
}

/// GET /api/v1/todos?page_num=&page_size=
pub async fn get_user_todos(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<ApiResponse<Vec<Todo>>> {
    let (limit, offset) = query.limit_offset()?;

    let todos = state
        .store
        .get_user_todos(&auth.username, limit, offset)
        .await?;

    Ok(ApiResponse(todos))
}

/// PATCH /api/v1/todos/:id
#[tracing::instrument(skip_all, fields(username = %auth.username, todo_id = %id))]
pub async fn update_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateTodoRequest>,
) -> Result<ApiResponse<Todo>> {
    let id = parse_todo_id(&id)?;
    state.validator.validate(&req)?;

    let todo = state
        .store
        .get_todo_by_id(id)
        .await
        .map_err(todo_not_found(TODO_NOT_FOUND_MESSAGE))?;

    if todo.username != auth.username {
        tracing::warn!("attempt to update a todo owned by another user");
        return Err(AppError::Forbidden(FORBIDDEN_MESSAGE.to_string()));
    }

    let params = UpdateTodoParams {
        title: req.title,
        is_completed: req.is_completed,
    };

    // The todo may have been deleted since the ownership check.
    let updated = state
        .store
        .update_todo(todo.id, &params)
        .await
        .map_err(todo_not_found(TODO_NOT_FOUND_MESSAGE))?;

    Ok(ApiResponse(updated))
}

/// DELETE /api/v1/todos/:id
#[tracing::instrument(skip_all, fields(username = %auth.username, todo_id = %id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<&'static str>> {
    let id = parse_todo_id(&id)?;

    state
        .store
        .delete_todo_of_a_user(id, &auth.username)
        .await
        .map_err(todo_not_found(OWNED_TODO_NOT_FOUND_MESSAGE))?;

    Ok(ApiResponse(
        "Successfully deleted specified todo from your todo list",
    ))
}
