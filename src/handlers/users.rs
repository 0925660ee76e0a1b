use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ACCOUNT_NOT_FOUND_MESSAGE;
use crate::{
    db::{CreateUserParams, StoreError},
    error::{AppError, Result},
    extract::JsonBody,
    middleware::AuthUser,
    models::user::User,
    password::{hash_password, verify_password},
    response::ApiResponse,
    validation::{Field, FieldErrors, Rule, Validate, Value},
    AppState,
};

const BAD_CREDENTIALS_MESSAGE: &str = "Oops!! These credentials do not match our records";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterUserRequest {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterUserRequest {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new(
                "username",
                Value::Str(Some(&self.username)),
                &[Rule::Required, Rule::Alphanum, Rule::Min(2), Rule::Max(12)],
            ),
            Field::new(
                "full_name",
                Value::Str(Some(&self.full_name)),
                &[Rule::Required, Rule::FullName],
            ),
            Field::new(
                "email",
                Value::Str(Some(&self.email)),
                &[Rule::Required, Rule::Email],
            ),
            Field::new(
                "password",
                Value::Str(Some(&self.password)),
                &[Rule::Required, Rule::Min(6), Rule::Max(16)],
            ),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginUserRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginUserRequest {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("username", Value::Str(Some(&self.username)), &[Rule::Required]),
            Field::new("password", Value::Str(Some(&self.password)), &[Rule::Required]),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct LoginUserResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub user: User,
}

/// POST /api/v1/users
#[tracing::instrument(skip_all, fields(username = %req.username))]
pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterUserRequest>,
) -> Result<ApiResponse<User>> {
    state.validator.validate(&req)?;

    let params = CreateUserParams {
        hashed_password: hash_password(&req.password)?,
        username: req.username,
        email: req.email,
        full_name: req.full_name,
    };

    match state.store.create_user(&params).await {
        Ok(user) => {
            tracing::info!("registered new user");
            Ok(ApiResponse(user))
        }
        Err(StoreError::UniqueViolation(column)) => {
            let mut errors = FieldErrors::new();
            errors.insert(
                column.to_string(),
                vec![format!("This {column} is already taken")],
            );
            Err(AppError::Validation(errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /api/v1/users/login
#[tracing::instrument(skip_all, fields(username = %req.username))]
pub async fn login_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginUserRequest>,
) -> Result<ApiResponse<LoginUserResponse>> {
    state.validator.validate(&req)?;

    // Unknown user and wrong password must be indistinguishable.
    let bad_credentials = || AppError::Unauthorized(BAD_CREDENTIALS_MESSAGE.to_string());

    let user = match state.store.get_user(&req.username).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(bad_credentials()),
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&req.password, &user.hashed_password)? {
        return Err(bad_credentials());
    }

    let (access_token, payload) = state
        .tokens
        .create_token(&user.username, state.access_token_duration)?;

    Ok(ApiResponse(LoginUserResponse {
        access_token,
        access_token_expires_at: payload.expires_at,
        user,
    }))
}

/// GET /api/v1/users/me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<User>> {
    match state.store.get_user(&auth.username).await {
        Ok(user) => Ok(ApiResponse(user)),
        Err(StoreError::NotFound) => Err(AppError::NotFound(ACCOUNT_NOT_FOUND_MESSAGE.to_string())),
        Err(e) => Err(e.into()),
    }
}
