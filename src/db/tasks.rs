//! Task queries and writes.
//!
//! Every task read goes through [`task_select`], so callers always see the
//! category, assignee and creator names alongside the foreign keys.

use crate::api::{from_row, to_row, Embed, Filter, Query, RowStore, Select, StoreError, Table};
use crate::libs::error::{Error, Result};
use crate::libs::messages::Message;
use crate::libs::row_id::RowId;
use crate::libs::task::{NewTask, Task, TaskFilter, TaskStatus, TaskUpdate};
use serde_json::Value;

const TASK_COLUMNS: &[&str] = &[
    "task_id",
    "title",
    "description",
    "status",
    "priority",
    "due_date",
    "created_at",
    "updated_at",
    "category_id",
    "assignee_id",
    "creator_id",
];
const SEARCH_COLUMNS: &[&str] = &["title", "description"];

/// Task rows joined with their category, assignee and creator.
pub fn task_select() -> Select {
    Select::columns(TASK_COLUMNS)
        .embed(Embed::new("categories", Table::Categories, "category_id", &["category_id", "name", "color"]))
        .embed(Embed::new("assigned_user", Table::Users, "assignee_id", &["user_id", "username"]))
        .embed(Embed::new("creator", Table::Users, "creator_id", &["user_id", "username"]))
}

pub struct Tasks<'a, S: RowStore> {
    store: &'a S,
}

impl<'a, S: RowStore> Tasks<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn by_id(task_id: &RowId) -> Query {
        Query::new(Table::Tasks).eq("task_id", task_id)
    }

    /// Tasks matching every set filter, newest first.
    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut query = Query::new(Table::Tasks).select(task_select());
        if let Some(status) = &filter.status {
            query = query.eq("status", status.as_str());
        }
        if let Some(priority) = &filter.priority {
            query = query.eq("priority", priority.as_str());
        }
        if let Some(category_id) = &filter.category_id {
            query = query.eq("category_id", category_id);
        }
        if let Some(assignee_id) = &filter.assignee_id {
            query = query.eq("assignee_id", assignee_id);
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|term| !term.is_empty()) {
            query = query.filter(Filter::search(SEARCH_COLUMNS, term));
        }

        let rows = self.store.fetch(&query.order_by("created_at", false)).await?;
        rows.into_iter().map(from_row).collect()
    }

    pub async fn get(&self, task_id: &RowId) -> Result<Task> {
        let row = self.store.fetch_one(&Self::by_id(task_id).select(task_select())).await?;
        from_row(row)
    }

    pub async fn create(&self, task: &NewTask) -> Result<Task> {
        if task.title.trim().is_empty() {
            return Err(Error::required("title"));
        }
        let row = self.store.insert(Table::Tasks, to_row(task)?, &task_select()).await?;
        from_row(row)
    }

    pub async fn update(&self, task_id: &RowId, update: &TaskUpdate) -> Result<Task> {
        if update.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(Error::required("title"));
        }
        if update.is_empty() {
            return self.get(task_id).await;
        }
        let rows = self.store.update(&Self::by_id(task_id), to_row(update)?).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound.into());
        }
        self.get(task_id).await
    }

    pub async fn delete(&self, task_id: &RowId) -> Result<Task> {
        let rows = self.store.delete(&Self::by_id(task_id)).await?;
        let row = rows.into_iter().next().ok_or(StoreError::NotFound)?;
        from_row(row)
    }

    /// Self-assigns an unassigned task and moves it to in progress, whatever its prior status.
    ///
    /// The write is conditional on `assignee_id` still being null, so of two
    /// concurrent claims only one matches a row.
    pub async fn claim(&self, task_id: &RowId, user_id: &RowId) -> Result<Task> {
        let update = TaskUpdate {
            assignee_id: Some(Some(user_id.clone())),
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        let unclaimed = Self::by_id(task_id).eq("assignee_id", Value::Null);
        let rows = self.store.update(&unclaimed, to_row(&update)?).await?;
        if rows.is_empty() {
            self.get(task_id).await?;
            return Err(Error::validation(Message::TaskAlreadyAssigned));
        }
        self.get(task_id).await
    }

    /// Sets the status of a task assigned to `actor_id`.
    pub async fn update_status(&self, task_id: &RowId, actor_id: &RowId, status: &TaskStatus) -> Result<Task> {
        let task = self.get(task_id).await?;
        if task.assignee_id.as_ref() != Some(actor_id) {
            return Err(Error::Unauthorized(Message::TaskStatusNotAssignee));
        }
        let update = TaskUpdate {
            status: Some(status.clone()),
            ..Default::default()
        };
        self.update(task_id, &update).await
    }
}
