use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Current instant at the precision the database keeps.
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(user_id: Uuid, title: String, description: Option<String>) -> Self {
        let now = now_micros();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field-level changes for a todo. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl TodoPatch {
    pub fn apply(&self, todo: &mut Todo, updated_at: DateTime<Utc>) {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(description) = &self.description {
            todo.description = Some(description.clone());
        }
        todo.updated_at = updated_at;
    }
}
