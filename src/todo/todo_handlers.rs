use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use super::{
    todo_dto::{CreateTodoRequest, ListTodosQuery, TodoPage, UpdateTodoRequest},
    todo_models::Todo,
};
use crate::{
    error::{AppError, Result},
    extract::AppJson,
    middleware::AuthUser,
    state::AppState,
};

fn parse_todo_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("invalid id".to_string()))
}

/// List the authenticated user's todos, one page at a time
#[utoipa::path(
    get,
    path = "/todos",
    params(ListTodosQuery),
    responses(
        (status = 200, description = "Page of todos", body = TodoPage),
        (status = 401, description = "Unauthorized")
    ),
    tag = "todos",
    security(("token" = []))
)]
pub async fn get_todos(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    query: Option<Query<ListTodosQuery>>,
) -> Result<Json<TodoPage>> {
    // A query string that does not deserialize (e.g. a repeated key) pages
    // with the defaults, like any other unusable value.
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let page = state.todo_service.list_todos(user_id, &query).await?;
    Ok(Json(page))
}

/// Create a todo owned by the authenticated user
#[utoipa::path(
    post,
    path = "/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 200, description = "Todo created", body = Todo),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "todos",
    security(("token" = []))
)]
pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<CreateTodoRequest>,
) -> Result<Json<Todo>> {
    payload.validate()?;

    let todo = state.todo_service.create_todo(user_id, payload).await?;
    Ok(Json(todo))
}

#[utoipa::path(
    patch,
    path = "/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "Todo ID")
    ),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = Todo),
        (status = 400, description = "Invalid id or body"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Todo belongs to another user"),
        (status = 404, description = "Todo not found")
    ),
    tag = "todos",
    security(("token" = []))
)]
pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateTodoRequest>,
) -> Result<Json<Todo>> {
    let todo_id = parse_todo_id(&id)?;

    let todo = state.todo_service.update_todo(user_id, todo_id, payload).await?;
    Ok(Json(todo))
}

#[utoipa::path(
    delete,
    path = "/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "Todo ID")
    ),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 400, description = "Invalid id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Todo belongs to another user"),
        (status = 404, description = "Todo not found")
    ),
    tag = "todos",
    security(("token" = []))
)]
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let todo_id = parse_todo_id(&id)?;

    state.todo_service.delete_todo(user_id, todo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
