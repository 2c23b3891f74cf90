use super::category::CategoryRef;
use super::row_id::RowId;
use super::timestamp;
use super::user::UserRef;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const STATUS_PENDING: &str = "待领取";
pub const STATUS_IN_PROGRESS: &str = "进行中";
pub const STATUS_COMPLETED: &str = "已完成";
pub const STATUS_OVERDUE: &str = "已逾期";

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_HIGH: &str = "high";

/// Task lifecycle state, stored as its wire string.
///
/// `Overdue` is a stored value set by whoever edits the task. It is never
/// derived from `due_date`; see [`Task::is_past_due`] for the time-based check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
    Other(String),
}

impl TaskStatus {
    pub const RECOGNIZED: [&'static str; 4] = [STATUS_PENDING, STATUS_IN_PROGRESS, STATUS_COMPLETED, STATUS_OVERDUE];

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => STATUS_PENDING,
            TaskStatus::InProgress => STATUS_IN_PROGRESS,
            TaskStatus::Completed => STATUS_COMPLETED,
            TaskStatus::Overdue => STATUS_OVERDUE,
            TaskStatus::Other(value) => value,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            STATUS_PENDING => TaskStatus::Pending,
            STATUS_IN_PROGRESS => TaskStatus::InProgress,
            STATUS_COMPLETED => TaskStatus::Completed,
            STATUS_OVERDUE => TaskStatus::Overdue,
            _ => TaskStatus::Other(value),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
    Other(String),
}

impl Priority {
    pub const RECOGNIZED: [&'static str; 3] = [PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_HIGH];

    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => PRIORITY_LOW,
            Priority::Medium => PRIORITY_MEDIUM,
            Priority::High => PRIORITY_HIGH,
            Priority::Other(value) => value,
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.as_str() {
            PRIORITY_LOW => Priority::Low,
            PRIORITY_MEDIUM => Priority::Medium,
            PRIORITY_HIGH => Priority::High,
            _ => Priority::Other(value),
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A task row together with its joined category, assignee and creator.
///
/// Reporting queries select only a few columns, so everything except the
/// status is optional here and absent fields count as nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub task_id: Option<RowId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category_id: Option<RowId>,
    #[serde(default)]
    pub assignee_id: Option<RowId>,
    #[serde(default)]
    pub creator_id: Option<RowId>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "categories")]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub assigned_user: Option<UserRef>,
    #[serde(default)]
    pub creator: Option<UserRef>,
}

impl Task {
    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().map(TaskStatus::as_str)
    }

    pub fn priority_str(&self) -> Option<&str> {
        self.priority.as_ref().map(Priority::as_str)
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(TaskStatus::Completed)
    }

    /// Time-derived overdue check: a due date in the past on a task that is not completed.
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        matches!(self.due_date, Some(due) if due < now) && !self.is_completed()
    }

    pub fn assignee_name(&self) -> Option<&str> {
        self.assigned_user.as_ref().and_then(|user| user.username.as_deref())
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().and_then(|category| category.name.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub category_id: RowId,
    pub assignee_id: Option<RowId>,
    pub creator_id: RowId,
}

impl NewTask {
    /// A new unclaimed task with default status and priority.
    pub fn new(title: &str, category_id: RowId, creator_id: RowId) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            due_date: None,
            category_id,
            assignee_id: None,
            creator_id,
        }
    }
}

/// Partial task update. For nullable columns `Some(None)` writes null.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<RowId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Option<RowId>>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.category_id.is_none()
            && self.assignee_id.is_none()
    }
}

/// Listing filters. Every set field narrows the result; `search` matches
/// title or description, case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub category_id: Option<RowId>,
    pub assignee_id: Option<RowId>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stored_statuses_map_to_variants() {
        let task: Task = serde_json::from_str(r#"{"status": "已完成", "priority": "urgent"}"#).unwrap();
        assert!(task.is_completed());
        assert_eq!(task.priority, Some(Priority::Other("urgent".to_string())));
    }

    #[test]
    fn past_due_ignores_completed_tasks() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let mut task = Task {
            due_date: Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        assert!(task.is_past_due(now));
        task.status = Some(TaskStatus::Completed);
        assert!(!task.is_past_due(now));
        task.due_date = None;
        task.status = Some(TaskStatus::Pending);
        assert!(!task.is_past_due(now));
    }

    #[test]
    fn update_serializes_explicit_nulls() {
        let update = TaskUpdate {
            assignee_id: Some(None),
            status: Some(TaskStatus::Pending),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"status": "待领取", "assignee_id": null}));
    }
}
