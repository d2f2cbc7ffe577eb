use std::sync::Arc;

use super::{
    auth_dto::{LoginRequest, RegisterRequest},
    password::{hash_password_blocking, verify_password_blocking},
    token_service::TokenService,
};
use crate::{
    db::bounded,
    error::{AppError, Result},
    user::{User, UserRepository},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    token_service: TokenService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_service: TokenService,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            user_repo,
            token_service,
            bcrypt_cost,
        }
    }

    /// Creates the account and returns its session token.
    pub async fn register(&self, payload: RegisterRequest) -> Result<String> {
        let existing = bounded(self.user_repo.count_by_email(&payload.email)).await?;
        if existing > 0 {
            return Err(AppError::Conflict("Email already exists".into()));
        }

        let password_hash = hash_password_blocking(payload.password, self.bcrypt_cost).await?;
        let mut user = User::new(payload.name, payload.email, password_hash);

        let tokens = self.token_service.issue(&user.name, &user.email, user.id)?;
        user.token = Some(tokens.token.clone());
        user.refresh_token = Some(tokens.refresh_token);

        bounded(self.user_repo.insert(&user)).await?;
        tracing::info!("Registered user {}", user.id);

        Ok(tokens.token)
    }

    /// Checks credentials, rotates the stored tokens and returns the new
    /// session token.
    pub async fn login(&self, payload: LoginRequest) -> Result<String> {
        let user = bounded(self.user_repo.find_by_email(&payload.email))
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

        if !verify_password_blocking(payload.password, user.password_hash.clone()).await? {
            tracing::debug!("Password mismatch for user {}", user.id);
            return Err(AppError::Unauthorized("Invalid email or password".into()));
        }

        let tokens = self.token_service.issue(&user.name, &user.email, user.id)?;
        self.token_service.persist(&tokens, user.id).await?;
        tracing::info!("User {} logged in", user.id);

        Ok(tokens.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::MIN_BCRYPT_COST;
    use crate::user::InMemoryUserRepository;

    fn setup() -> (AuthService, TokenService, Arc<InMemoryUserRepository>) {
        let users = Arc::new(InMemoryUserRepository::new());
        let tokens = TokenService::new("test-secret", 24, users.clone());
        let auth = AuthService::new(users.clone(), tokens.clone(), MIN_BCRYPT_COST);
        (auth, tokens, users)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ada".into(),
            email: email.into(),
            password: "correct-horse".into(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hashed_user_with_tokens() {
        let (auth, tokens, users) = setup();
        let token = auth.register(register_request("ada@example.com")).await.unwrap();

        let stored = users.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "correct-horse");
        assert_eq!(stored.token.as_deref(), Some(token.as_str()));
        assert!(stored.refresh_token.is_some());
        assert_ne!(stored.refresh_token.as_deref(), Some(token.as_str()));
        assert_eq!(tokens.validate(&token).unwrap().sub, stored.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let (auth, _, users) = setup();
        auth.register(register_request("ada@example.com")).await.unwrap();

        let err = auth.register(register_request("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(users.count_by_email("ada@example.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_login_returns_freshly_issued_token() {
        let (auth, tokens, users) = setup();
        let registered = auth.register(register_request("ada@example.com")).await.unwrap();
        let before = users.find_by_email("ada@example.com").await.unwrap().unwrap();

        // Issue times are second-granular.
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let token = auth
            .login(login_request("ada@example.com", "correct-horse"))
            .await
            .unwrap();

        let after = users.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_ne!(token, registered);
        assert_eq!(after.token.as_deref(), Some(token.as_str()));
        assert_ne!(after.refresh_token, before.refresh_token);
        assert!(after.updated_at > before.updated_at);
        assert!(tokens.validate(&token).is_ok());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let (auth, _, _) = setup();
        auth.register(register_request("ada@example.com")).await.unwrap();

        let wrong_password = auth
            .login(login_request("ada@example.com", "wrong-horse"))
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, AppError::Unauthorized(_)));

        let unknown = auth
            .login(login_request("nobody@example.com", "correct-horse"))
            .await
            .unwrap_err();
        assert!(matches!(unknown, AppError::Unauthorized(_)));
    }
}
