use std::any::Any;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    error::{AppError, INTERNAL_ERROR_MESSAGE},
    token::TokenError,
    AppState,
};

const AUTHORIZATION_TYPE: &str = "bearer";
pub const UNAUTHORIZED_MESSAGE: &str = "You are not authorized to perform the action";
pub const SESSION_EXPIRED_MESSAGE: &str =
    "Your session has expired. Please, log in again to start a new session";

/// The identity proven by the bearer token of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
}

/// Verifies `Authorization: Bearer <token>` and hands the caller's identity
/// to the handler as an [`AuthUser`]. Any failure ends the request with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let unauthorized = || AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string());

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .ok_or_else(unauthorized)?;

    let fields: Vec<&str> = auth_header.split_whitespace().collect();
    if fields.len() < 2 || !fields[0].eq_ignore_ascii_case(AUTHORIZATION_TYPE) {
        return Err(unauthorized());
    }

    let payload = state.tokens.verify_token(fields[1]).map_err(|e| match e {
        TokenError::Expired => AppError::Unauthorized(SESSION_EXPIRED_MESSAGE.to_string()),
        _ => unauthorized(),
    })?;

    req.extensions_mut().insert(AuthUser {
        username: payload.username,
    });

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()))
    }
}

/// Last line of defence: turns a handler panic into a logged 500.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %details, "request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": INTERNAL_ERROR_MESSAGE,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn envelope(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_panic_payloads_are_masked() {
        let payloads: Vec<Box<dyn Any + Send + 'static>> = vec![
            Box::new(String::from("index out of bounds")),
            Box::new("called `Option::unwrap()` on a `None` value"),
            Box::new(42_u32),
        ];

        for payload in payloads {
            let (status, body) = envelope(handle_panic(payload)).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                body,
                json!({"success": false, "error": INTERNAL_ERROR_MESSAGE})
            );
        }
    }
}
