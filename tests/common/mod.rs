#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use todo_api::db::{self, CreateUserParams, Store};
use todo_api::models::user::User;
use todo_api::password::hash_password;
use todo_api::rest;
use todo_api::token::TokenService;
use todo_api::validation::Validator;
use todo_api::AppState;
use tower::ServiceExt;

pub const TEST_KEY: &str = "test-symmetric-key-with-32-chars!";

pub struct TestApp {
    pub state: AppState,
    pub pool: SqlitePool,
    _dir: TempDir,
}

impl TestApp {
    pub fn store(&self) -> &Store {
        &self.state.store
    }

    pub fn router(&self) -> Router {
        rest::router(self.state.clone())
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Registers `username` through the API and returns a fresh access token.
    pub async fn register_and_login(&self, username: &str) -> String {
        let (status, _) = self
            .send(api_request(
                Method::POST,
                "/api/v1/users",
                None,
                Some(json!({
                    "username": username,
                    "full_name": "Test User",
                    "email": format!("{username}@example.com"),
                    "password": "secret1",
                })),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "registration of {username} failed");

        let (status, body) = self
            .send(api_request(
                Method::POST,
                "/api/v1/users/login",
                None,
                Some(json!({"username": username, "password": "secret1"})),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "login of {username} failed");
        body["data"]["access_token"].as_str().unwrap().to_string()
    }

    pub async fn create_todo(&self, token: &str, title: &str) -> Value {
        let (status, body) = self
            .send(api_request(
                Method::POST,
                "/api/v1/todos",
                Some(token),
                Some(json!({"title": title})),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "todo creation failed: {body}");
        body["data"].clone()
    }
}

pub async fn setup() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");
    let pool = db::connect(path.to_str().unwrap()).await.unwrap();
    db::migrate(&pool).await.unwrap();

    let state = AppState::new(
        Store::new(pool.clone()),
        TokenService::new(TEST_KEY).unwrap(),
        Validator::new().unwrap(),
        chrono::Duration::minutes(15),
    );

    TestApp {
        state,
        pool,
        _dir: dir,
    }
}

pub fn api_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn insert_user(store: &Store, username: &str, email: &str) -> User {
    store
        .create_user(&CreateUserParams {
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Test User".to_string(),
            hashed_password: hash_password("secret1").unwrap(),
        })
        .await
        .unwrap()
}
