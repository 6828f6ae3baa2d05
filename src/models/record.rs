use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tag::TagResponse;

/// Something the application labels with tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Record {
    pub id: Uuid,
    pub title: String,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecord {
    pub title: String,
    pub body: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: Uuid,
    pub title: String,
    pub body: Option<String>,
    pub tags: Vec<TagResponse>,
    pub created_at: DateTime<Utc>,
}

impl Record {
    pub fn into_response(self, tags: Vec<TagResponse>) -> RecordResponse {
        RecordResponse {
            id: self.id,
            title: self.title,
            body: self.body,
            tags,
            created_at: self.created_at,
        }
    }
}
