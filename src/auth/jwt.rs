use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub const SESSION_TOKEN_TYPE: &str = "session";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Payload of a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user_id
    pub name: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub typ: String,
}

/// Payload of a refresh token: a rotation ticket naming its user, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub typ: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token could not be parsed")]
    Malformed,
    #[error("token has expired")]
    Expired,
}

pub fn create_jwt<T: Serialize>(claims: &T, secret: &str) -> Result<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

/// Checks the signature and decodes the payload. Expiry is left to the
/// caller so it can be judged against an explicit instant.
pub fn verify_jwt<T: DeserializeOwned>(
    token: &str,
    secret: &str,
) -> std::result::Result<T, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    decode::<T>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })
}
