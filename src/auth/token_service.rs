use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::jwt::{
    create_jwt, verify_jwt, Claims, RefreshClaims, TokenError, REFRESH_TOKEN_TYPE,
    SESSION_TOKEN_TYPE,
};
use crate::{
    db::bounded,
    error::{AppError, Result},
    user::UserRepository,
};

#[derive(Debug, Clone, PartialEq)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Issues and checks signed session tokens and records the latest pair on
/// the user.
#[derive(Clone)]
pub struct TokenService {
    secret: Arc<str>,
    validity: Duration,
    users: Arc<dyn UserRepository>,
}

impl TokenService {
    pub fn new(secret: &str, validity_hours: i64, users: Arc<dyn UserRepository>) -> Self {
        Self {
            secret: Arc::from(secret),
            validity: Duration::hours(validity_hours),
            users,
        }
    }

    pub fn issue(&self, name: &str, email: &str, user_id: Uuid) -> Result<TokenPair> {
        self.issue_at(name, email, user_id, Utc::now())
    }

    pub fn issue_at(
        &self,
        name: &str,
        email: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TokenPair> {
        let iat = now.timestamp();
        let exp = (now + self.validity).timestamp();

        let claims = Claims {
            sub: user_id,
            name: name.to_string(),
            email: email.to_string(),
            iat,
            exp,
            typ: SESSION_TOKEN_TYPE.to_string(),
        };
        let refresh_claims = RefreshClaims {
            sub: user_id,
            iat,
            exp,
            typ: REFRESH_TOKEN_TYPE.to_string(),
        };

        Ok(TokenPair {
            token: create_jwt(&claims, &self.secret)?,
            refresh_token: create_jwt(&refresh_claims, &self.secret)?,
        })
    }

    /// Overwrites the user's stored tokens. Storage failures are logged and
    /// returned to the caller.
    pub async fn persist(&self, pair: &TokenPair, user_id: Uuid) -> Result<()> {
        let matched = bounded(self.users.update_tokens(
            user_id,
            &pair.token,
            &pair.refresh_token,
            Utc::now(),
        ))
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist tokens for user {}: {}", user_id, e);
            e
        })?;

        if matched == 0 {
            tracing::error!("Token update matched no user {}", user_id);
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    pub fn validate(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Session tokens only; a refresh token never validates here.
    pub fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<Claims, TokenError> {
        let claims: Claims = verify_jwt(token, &self.secret)?;

        if claims.typ != SESSION_TOKEN_TYPE {
            return Err(TokenError::Malformed);
        }
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{InMemoryUserRepository, User};

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret, 24, Arc::new(InMemoryUserRepository::new()))
    }

    #[test]
    fn test_issued_token_validates_now() {
        let tokens = service("secret");
        let user_id = Uuid::new_v4();
        let pair = tokens.issue("Ada", "ada@example.com", user_id).unwrap();

        let claims = tokens.validate(&pair.token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
        assert_ne!(pair.token, pair.refresh_token);
    }

    #[test]
    fn test_token_expires_after_window() {
        let tokens = service("secret");
        let issued = Utc::now();
        let pair = tokens.issue_at("Ada", "ada@example.com", Uuid::new_v4(), issued).unwrap();

        let just_before = issued + Duration::hours(24) - Duration::seconds(1);
        assert!(tokens.validate_at(&pair.token, just_before).is_ok());

        let at_expiry = issued + Duration::hours(24);
        assert_eq!(tokens.validate_at(&pair.token, at_expiry).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_different_secret_is_invalid_signature() {
        let pair = service("secret-a").issue("Ada", "ada@example.com", Uuid::new_v4()).unwrap();
        let err = service("secret-b").validate(&pair.token).unwrap_err();
        assert_eq!(err, TokenError::InvalidSignature);
    }

    #[test]
    fn test_refresh_token_is_not_a_session_token() {
        let tokens = service("secret");
        let pair = tokens.issue("Ada", "ada@example.com", Uuid::new_v4()).unwrap();
        assert_eq!(tokens.validate(&pair.refresh_token).unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_superseded_token_still_validates() {
        let tokens = service("secret");
        let user_id = Uuid::new_v4();
        let earlier = Utc::now() - Duration::seconds(5);
        let first = tokens
            .issue_at("Ada", "ada@example.com", user_id, earlier)
            .unwrap();
        let second = tokens.issue("Ada", "ada@example.com", user_id).unwrap();

        assert!(tokens.validate(&first.token).is_ok());
        assert!(tokens.validate(&second.token).is_ok());
    }

    #[tokio::test]
    async fn test_persist_overwrites_user_tokens() {
        let users = Arc::new(InMemoryUserRepository::new());
        let tokens = TokenService::new("secret", 24, users.clone());
        let user = User::new("Ada".into(), "ada@example.com".into(), "hash".into());
        users.insert(&user).await.unwrap();

        let pair = tokens.issue(&user.name, &user.email, user.id).unwrap();
        tokens.persist(&pair, user.id).await.unwrap();

        let stored = users.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(stored.token.as_deref(), Some(pair.token.as_str()));
        assert_eq!(stored.refresh_token.as_deref(), Some(pair.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn test_persist_for_missing_user_fails() {
        let tokens = service("secret");
        let user_id = Uuid::new_v4();
        let pair = tokens.issue("Ada", "ada@example.com", user_id).unwrap();

        let err = tokens.persist(&pair, user_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
