use axum::{extract::State, Json};
use validator::Validate;

use super::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::{error::Result, extract::AppJson, state::AppState};

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already exists")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;

    let token = state.auth_service.register(payload).await?;

    Ok(Json(AuthResponse { token }))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let token = state.auth_service.login(payload).await?;

    Ok(Json(AuthResponse { token }))
}
