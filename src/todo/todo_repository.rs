use axum::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::PgPool;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use uuid::Uuid;

use super::todo_models::{Todo, TodoPatch};
use crate::error::Result;

#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>>;

    /// All todos owned by `user_id`, oldest first.
    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Todo>>;

    async fn insert(&self, todo: &Todo) -> Result<()>;

    /// Applies `patch` only when the todo exists and belongs to `user_id`.
    /// Returns the stored record after the write, or `None` if nothing matched.
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: &TodoPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Todo>>;

    /// Deletes the todo only when it belongs to `user_id`. Returns the number
    /// of deleted rows.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64>;
}

const TODO_COLUMNS: &str = "id, user_id, title, description, created_at, updated_at";

#[derive(Clone)]
pub struct PgTodoRepository {
    pool: PgPool,
}

impl PgTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE id = $1",
            TODO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE user_id = $1 ORDER BY created_at ASC, seq ASC",
            TODO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    async fn insert(&self, todo: &Todo) -> Result<()> {
        sqlx::query(
            "INSERT INTO todos (id, user_id, title, description, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(todo.id)
        .bind(todo.user_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: &TodoPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "UPDATE todos
             SET title = COALESCE($3, title),
                 description = COALESCE($4, description),
                 updated_at = $5
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Process-local todo store. A monotonic sequence number keeps listing in
/// insertion order when creation timestamps collide.
#[derive(Clone, Default)]
pub struct InMemoryTodoRepository {
    todos: Arc<DashMap<Uuid, (u64, Todo)>>,
    seq: Arc<AtomicU64>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>> {
        Ok(self.todos.get(&id).map(|entry| entry.1.clone()))
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Todo>> {
        let mut owned: Vec<(u64, Todo)> = self
            .todos
            .iter()
            .filter(|entry| entry.1.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        owned.sort_by(|a, b| (a.1.created_at, a.0).cmp(&(b.1.created_at, b.0)));

        Ok(owned.into_iter().map(|(_, todo)| todo).collect())
    }

    async fn insert(&self, todo: &Todo) -> Result<()> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.todos.insert(todo.id, (seq, todo.clone()));
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: &TodoPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Todo>> {
        match self.todos.get_mut(&id) {
            Some(mut entry) if entry.1.user_id == user_id => {
                patch.apply(&mut entry.1, updated_at);
                Ok(Some(entry.1.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64> {
        let removed = self.todos.remove_if(&id, |_, (_, todo)| todo.user_id == user_id);
        Ok(removed.is_some() as u64)
    }
}
