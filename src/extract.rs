use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejections render through `AppError`, so a body that fails to
/// bind answers 400 with the usual `{"error": ...}` payload.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
