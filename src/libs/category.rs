use super::row_id::RowId;
use super::timestamp;
use super::user::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COLOR: &str = "#007bff";

/// Palette offered when creating or editing a category.
pub const PALETTE: &[(&str, &str)] = &[
    ("#007bff", "blue"),
    ("#28a745", "green"),
    ("#ffc107", "yellow"),
    ("#dc3545", "red"),
    ("#6f42c1", "purple"),
    ("#fd7e14", "orange"),
    ("#20c997", "teal"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: RowId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub creator_id: Option<RowId>,
    /// Joined creator username.
    #[serde(default)]
    pub creator: Option<UserRef>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Category reference embedded in task rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub category_id: Option<RowId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub creator_id: RowId,
}

impl NewCategory {
    pub fn new(name: &str, description: Option<String>, color: Option<String>, creator_id: RowId) -> Self {
        Self {
            name: name.to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
            color: color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            creator_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
