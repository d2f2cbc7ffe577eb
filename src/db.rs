use std::future::Future;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::{AppError, Result};

pub type DbPool = PgPool;

/// Upper bound for any single storage call issued while serving a request.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn create_pool(database_url: &str) -> std::result::Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(STORE_TIMEOUT)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &DbPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Runs a storage future under [`STORE_TIMEOUT`]. There is no retry; an
/// expired deadline fails the request with [`AppError::Timeout`].
pub async fn bounded<T, F>(op: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(STORE_TIMEOUT, op)
        .await
        .map_err(|_| AppError::Timeout)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result: Result<()> = bounded(std::future::pending()).await;
        assert!(matches!(result, Err(AppError::Timeout)));
    }

    #[tokio::test]
    async fn test_bounded_passes_through() {
        let result = bounded(async { Ok::<_, AppError>(7) }).await;
        assert_eq!(result.unwrap(), 7);

        let result: Result<()> = bounded(async { Err(AppError::NotFound("gone".into())) }).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
