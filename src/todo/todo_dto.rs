use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::todo_models::Todo;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTodoRequest {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
}

/// Partial update. Absent or empty fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Raw pagination parameters. Values that are missing, unparseable or below
/// one fall back to the defaults, so `limit=0` yields a page of ten.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTodosQuery {
    /// Page number, starting at 1
    pub page: Option<String>,
    /// Items per page
    pub limit: Option<String>,
}

impl ListTodosQuery {
    pub fn page(&self) -> i64 {
        parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        parse_positive(self.limit.as_deref()).unwrap_or(DEFAULT_LIMIT)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).filter(|v| *v >= 1)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoPage {
    pub data: Vec<Todo>,
    pub page: i64,
    pub limit: i64,
    /// Number of todos the caller owns across all pages
    pub total: usize,
}
