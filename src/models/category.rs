use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::slug::Slugged;

/// A category. Categories nest through `parent_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// `None` until the backend has stored it.
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub children: Vec<Category>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Slugged for Category {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn entity_key(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}

/// Input for creating a category. `PUT` accepts the same shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
