use crate::domain::CategoryId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub slug: String,
    /// Upstream parent id, trusted as-is (no cycle check).
    pub parent_id: Option<i32>,
    pub nsfw: bool,
    pub child_count: i32,
    pub description: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
