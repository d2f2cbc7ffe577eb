use anyhow::{bail, Context};
use std::sync::Arc;

use crate::{
    auth::{
        password::{MAX_BCRYPT_COST, MIN_BCRYPT_COST},
        AuthService, TokenService,
    },
    todo::{TodoRepository, TodoService},
    user::UserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub token_service: TokenService,
    pub auth_service: AuthService,
    pub todo_service: TodoService,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        user_repository: Arc<dyn UserRepository>,
        todo_repository: Arc<dyn TodoRepository>,
    ) -> Self {
        let token_service = TokenService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
            user_repository.clone(),
        );
        let auth_service =
            AuthService::new(user_repository, token_service.clone(), config.bcrypt_cost);
        let todo_service = TodoService::new(todo_repository);

        Self {
            config,
            token_service,
            auth_service,
            todo_service,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("unknown STORAGE_BACKEND {:?} (expected postgres or memory)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub host: String,
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let jwt_expiration_hours: i64 = lookup("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|| "24".to_string())
            .parse()
            .context("JWT_EXPIRATION_HOURS must be a number")?;
        if jwt_expiration_hours <= 0 {
            bail!("JWT_EXPIRATION_HOURS must be positive");
        }

        let bcrypt_cost: u32 = lookup("BCRYPT_COST")
            .unwrap_or_else(|| "14".to_string())
            .parse()
            .context("BCRYPT_COST must be a number")?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            );
        }

        let storage_backend: StorageBackend = lookup("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .parse()?;
        let database_url = lookup("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND is postgres");
        }

        Ok(Self {
            jwt_secret,
            jwt_expiration_hours,
            bcrypt_cost,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .context("PORT must be a valid port number")?,
            storage_backend,
            database_url,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_hours: 24,
            bcrypt_cost: MIN_BCRYPT_COST,
            host: "127.0.0.1".to_string(),
            port: 0,
            storage_backend: StorageBackend::Memory,
            database_url: None,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}
