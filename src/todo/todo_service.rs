use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    todo_dto::{CreateTodoRequest, ListTodosQuery, TodoPage, UpdateTodoRequest},
    todo_models::{now_micros, Todo, TodoPatch},
    todo_repository::TodoRepository,
};
use crate::{
    db::bounded,
    error::{AppError, Result},
};

/// Service layer for todo business rules. Every operation is scoped to the
/// authenticated caller.
#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_todo(&self, user_id: Uuid, payload: CreateTodoRequest) -> Result<Todo> {
        let todo = Todo::new(user_id, payload.title, payload.description);
        bounded(self.repo.insert(&todo)).await?;
        tracing::debug!("User {} created todo {}", user_id, todo.id);

        Ok(todo)
    }

    pub async fn update_todo(
        &self,
        user_id: Uuid,
        todo_id: Uuid,
        payload: UpdateTodoRequest,
    ) -> Result<Todo> {
        let existing = self.owned_todo(user_id, todo_id).await?;

        let patch = TodoPatch {
            title: payload.title.filter(|t| !t.is_empty()),
            description: payload.description.filter(|d| !d.is_empty()),
        };
        // updated_at must move forward even within one clock tick.
        let updated_at = now_micros().max(existing.updated_at + Duration::microseconds(1));

        bounded(self.repo.update(todo_id, user_id, &patch, updated_at))
            .await?
            .ok_or_else(|| AppError::NotFound("Todo not found".into()))
    }

    pub async fn delete_todo(&self, user_id: Uuid, todo_id: Uuid) -> Result<()> {
        self.owned_todo(user_id, todo_id).await?;

        let deleted = bounded(self.repo.delete(todo_id, user_id)).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Todo not found".into()));
        }

        tracing::debug!("User {} deleted todo {}", user_id, todo_id);
        Ok(())
    }

    pub async fn list_todos(&self, user_id: Uuid, query: &ListTodosQuery) -> Result<TodoPage> {
        let page = query.page();
        let limit = query.limit();

        let todos = bounded(self.repo.find_by_owner(user_id)).await?;
        let total = todos.len();

        Ok(TodoPage {
            data: paginate(todos, page, limit),
            page,
            limit,
            total,
        })
    }

    /// Resolves the todo and checks the caller owns it.
    async fn owned_todo(&self, user_id: Uuid, todo_id: Uuid) -> Result<Todo> {
        let todo = bounded(self.repo.find_by_id(todo_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;

        if todo.user_id != user_id {
            tracing::debug!("User {} denied access to todo {}", user_id, todo_id);
            return Err(AppError::Forbidden("Forbidden".into()));
        }

        Ok(todo)
    }
}

/// Slices `(page-1)*limit .. page*limit`, clamped to the item count. Expects
/// `page >= 1` and `limit >= 1`.
fn paginate<T>(mut items: Vec<T>, page: i64, limit: i64) -> Vec<T> {
    let len = items.len();
    let start = usize::try_from((page - 1).saturating_mul(limit))
        .unwrap_or(usize::MAX)
        .min(len);
    let end = start
        .saturating_add(usize::try_from(limit).unwrap_or(usize::MAX))
        .min(len);

    items.drain(start..end).collect()
}
