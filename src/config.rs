use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_source: String,
    pub server_host: String,
    pub server_port: u16,
    pub symmetric_key: String,
    pub access_token_duration: Duration,
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads settings from the process environment, after pulling in `app.env`
    /// and `.env` from the working directory when they exist.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::from_filename("app.env").ok();
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_port: u16 = match lookup("SERVER_PORT") {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                key: "SERVER_PORT",
                reason: e.to_string(),
            })?,
            None => 5000,
        };

        let symmetric_key = lookup("SYMMETRIC_KEY").ok_or(ConfigError::Missing("SYMMETRIC_KEY"))?;

        let access_token_duration = lookup("ACCESS_TOKEN_DURATION")
            .ok_or(ConfigError::Missing("ACCESS_TOKEN_DURATION"))
            .and_then(|raw| {
                humantime::parse_duration(&raw).map_err(|e| ConfigError::Invalid {
                    key: "ACCESS_TOKEN_DURATION",
                    reason: e.to_string(),
                })
            })?;

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    reason: format!("expected `pretty` or `json`, got `{other}`"),
                })
            }
        };

        Ok(Config {
            db_source: lookup("DB_SOURCE").unwrap_or_else(|| "todo.db".into()),
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port,
            symmetric_key,
            access_token_duration,
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| "todo_api=debug,tower_http=info".into()),
            log_format,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
