use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 30))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Only the session token is handed out; the refresh token stays server-side.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register("Ada", "ada@example.com", "secret").validate().is_ok());
        assert!(register("A", "ada@example.com", "secret").validate().is_err());
        assert!(register(&"a".repeat(31), "ada@example.com", "secret").validate().is_err());
        assert!(register("Ada", "not-an-email", "secret").validate().is_err());
        assert!(register("Ada", "ada@example.com", "12345").validate().is_err());
    }
}
