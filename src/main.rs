mod auth;
mod db;
mod error;
mod extract;
mod middleware;
mod routes;
mod state;
mod todo;
mod user;

use anyhow::Context;
use db::{create_pool, run_migrations};
use routes::create_router;
use state::{AppState, Config, StorageBackend};
use std::sync::Arc;
use todo::{InMemoryTodoRepository, PgTodoRepository, TodoRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user::{InMemoryUserRepository, PgUserRepository, UserRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env().context("Invalid configuration")?);

    let (user_repository, todo_repository): (Arc<dyn UserRepository>, Arc<dyn TodoRepository>) =
        match config.storage_backend {
            StorageBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL must be set")?;

                // Sanitize URL for logging (hide password)
                let url_for_logging = database_url
                    .split('@')
                    .last()
                    .map(|host| format!("<hidden>@{}", host))
                    .unwrap_or_else(|| "<invalid format>".to_string());

                tracing::info!("Connecting to database at {}...", url_for_logging);
                let db = create_pool(database_url)
                    .await
                    .with_context(|| {
                        format!("Failed to connect to database at {}", url_for_logging)
                    })?;

                tracing::info!("Running migrations...");
                run_migrations(&db).await.context("Failed to run migrations")?;

                let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(db.clone()));
                let todos: Arc<dyn TodoRepository> = Arc::new(PgTodoRepository::new(db));
                (users, todos)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on shutdown");
                let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
                let todos: Arc<dyn TodoRepository> = Arc::new(InMemoryTodoRepository::new());
                (users, todos)
            }
        };

    let state = AppState::new(config.clone(), user_repository, todo_repository);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
