//! Stateless access tokens.
//!
//! A token is an HS256-signed JWT whose claims are the [`Payload`] itself.
//! Nothing is stored server-side, so a token stays valid until it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const MIN_SYMMETRIC_KEY_SIZE: usize = 32;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is invalid")]
    Invalid,
    #[error("token is expired")]
    Expired,
    #[error("symmetric key must have at least 32 characters")]
    InvalidKeySize,
    #[error("token duration is out of range")]
    InvalidDuration,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub id: Uuid,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Payload {
    pub fn new(username: &str, duration: Duration) -> Result<Self, TokenError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(duration)
            .ok_or(TokenError::InvalidDuration)?;

        Ok(Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            issued_at: now,
            expires_at,
        })
    }
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(symmetric_key: &str) -> Result<Self, TokenError> {
        if symmetric_key.len() < MIN_SYMMETRIC_KEY_SIZE {
            return Err(TokenError::InvalidKeySize);
        }

        // Expiry lives in the payload and is checked after the signature.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(symmetric_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(symmetric_key.as_bytes()),
            validation,
        })
    }

    pub fn create_token(
        &self,
        username: &str,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(username, duration)?;
        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)?;
        Ok((token, payload))
    }

    pub fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        self.verify_token_at(token, Utc::now())
    }

    fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Payload, TokenError> {
        let payload = decode::<Payload>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)?;

        if now > payload.expires_at {
            return Err(TokenError::Expired);
        }

        Ok(payload)
    }
}
