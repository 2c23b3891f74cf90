//! Fetches feeding the reporting aggregations in [`crate::libs::stats`].
//!
//! Each report selects only the columns its aggregation reads. Reports that
//! need several tables issue the fetches concurrently and fail with the first
//! error.

use crate::api::{from_row, Embed, Filter, Query, RowStore, Select, Table};
use crate::libs::category::Category;
use crate::libs::error::Result;
use crate::libs::row_id::RowId;
use crate::libs::stats::{
    self, CategoryStatistics, PersonalStatistics, SystemOverview, TaskStatistics, TaskTrends, UserStatistics,
    WorkloadStatistics,
};
use crate::libs::task::Task;
use crate::libs::timestamp;
use crate::libs::user::User;
use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::debug;

pub struct Reports<'a, S: RowStore> {
    store: &'a S,
}

impl<'a, S: RowStore> Reports<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    async fn rows<T: DeserializeOwned>(&self, query: Query) -> Result<Vec<T>> {
        self.store.fetch(&query).await?.into_iter().map(from_row).collect()
    }

    async fn users(&self) -> Result<Vec<User>> {
        self.rows(Query::new(Table::Users).columns(&["user_id", "username", "role", "created_at"]))
            .await
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        self.rows(Query::new(Table::Categories).columns(&["category_id", "name", "color"]))
            .await
    }

    async fn task_categories(&self) -> Result<Vec<Task>> {
        self.rows(Query::new(Table::Tasks).columns(&["category_id"])).await
    }

    pub async fn user_statistics(&self) -> Result<UserStatistics> {
        Ok(stats::user_statistics(&self.users().await?))
    }

    /// Status and priority counts, optionally limited to tasks the user is assigned to or created.
    pub async fn task_statistics(&self, user_id: Option<&RowId>) -> Result<TaskStatistics> {
        let mut query = Query::new(Table::Tasks).columns(&["status", "priority"]);
        if let Some(user_id) = user_id {
            query = query.filter(Filter::Or(vec![
                Filter::eq("assignee_id", user_id),
                Filter::eq("creator_id", user_id),
            ]));
        }
        let tasks: Vec<Task> = self.rows(query).await?;
        Ok(stats::task_statistics(&tasks))
    }

    pub async fn category_statistics(&self) -> Result<CategoryStatistics> {
        let (categories, tasks) = tokio::try_join!(self.categories(), self.task_categories())?;
        Ok(stats::category_statistics(&categories, &tasks))
    }

    /// Daily created/completed counts over the last `days` days.
    pub async fn task_trends(&self, days: u32) -> Result<TaskTrends> {
        let since = stats::window_start(Utc::now(), days);
        let query = Query::new(Table::Tasks)
            .columns(&["created_at", "status"])
            .gte("created_at", timestamp::format_timestamp(since));
        let tasks: Vec<Task> = self.rows(query).await?;
        debug!(days, tasks = tasks.len(), "task trends window");
        Ok(stats::task_trends(&tasks, days))
    }

    pub async fn workload_statistics(&self) -> Result<WorkloadStatistics> {
        let select = Select::columns(&["assignee_id", "status", "priority"]).embed(Embed::new(
            "assigned_user",
            Table::Users,
            "assignee_id",
            &["username"],
        ));
        let tasks: Vec<Task> = self.rows(Query::new(Table::Tasks).select(select)).await?;
        Ok(stats::workload_statistics(&tasks))
    }

    pub async fn personal_statistics(&self, user_id: &RowId) -> Result<PersonalStatistics> {
        let assigned = self.rows::<Task>(
            Query::new(Table::Tasks)
                .columns(&["status", "priority", "created_at", "due_date"])
                .eq("assignee_id", user_id),
        );
        let created = self.rows::<Task>(
            Query::new(Table::Tasks)
                .columns(&["status", "priority", "created_at"])
                .eq("creator_id", user_id),
        );
        let (assigned, created) = tokio::try_join!(assigned, created)?;
        Ok(stats::personal_statistics(&assigned, &created, Utc::now()))
    }

    pub async fn system_overview(&self) -> Result<SystemOverview> {
        let (users, tasks, categories) = tokio::try_join!(
            self.user_statistics(),
            self.task_statistics(None),
            self.category_statistics()
        )?;
        Ok(SystemOverview {
            users,
            tasks,
            categories,
            last_updated: Utc::now(),
        })
    }
}
