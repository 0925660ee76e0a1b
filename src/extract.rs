use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub const INVALID_PAYLOAD_MESSAGE: &str = "Invalid request payload";
pub const INVALID_QUERY_MESSAGE: &str = "Invalid query parameters";

/// `Json<T>` whose rejection is the API's own 400 envelope.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!(%rejection, "rejected request payload");
                Err(AppError::BadRequest(INVALID_PAYLOAD_MESSAGE.to_string()))
            }
        }
    }
}

/// `Query<T>` with the same 400 envelope on rejection.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => {
                tracing::debug!(%rejection, "rejected query string");
                Err(AppError::BadRequest(INVALID_QUERY_MESSAGE.to_string()))
            }
        }
    }
}
