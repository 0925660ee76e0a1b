pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod password;
pub mod response;
pub mod rest;
pub mod token;
pub mod validation;

use std::sync::Arc;

use db::Store;
use token::TokenService;
use validation::Validator;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub tokens: Arc<TokenService>,
    pub validator: Arc<Validator>,
    pub access_token_duration: chrono::Duration,
}

impl AppState {
    pub fn new(
        store: Store,
        tokens: TokenService,
        validator: Validator,
        access_token_duration: chrono::Duration,
    ) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            validator: Arc::new(validator),
            access_token_duration,
        }
    }
}
