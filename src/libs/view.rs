use super::category::Category;
use super::stats::{CategoryStatistics, PersonalStatistics, SystemOverview, TaskTrends, WorkloadStatistics};
use super::task::Task;
use super::user::User;
use anyhow::Result;
use chrono::{DateTime, Utc};
use prettytable::{row, Table};

const EMPTY: &str = "-";

fn date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| EMPTY.to_string(), |dt| dt.format("%Y-%m-%d").to_string())
}

fn datetime(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| EMPTY.to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string())
}

fn text(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or(EMPTY).to_string()
}

pub struct View {}

impl View {
    pub fn users(users: &[User]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "USERNAME", "ROLE", "CREATED"]);
        for user in users {
            table.add_row(row![user.user_id, user.username, user.role, date(user.created_at)]);
        }
        table.printstd();

        Ok(())
    }

    pub fn user(user: &User) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", user.user_id]);
        table.add_row(row!["USERNAME", user.username]);
        table.add_row(row!["ROLE", user.role]);
        table.add_row(row!["REGISTERED", datetime(user.created_at)]);
        table.printstd();

        Ok(())
    }

    pub fn categories(categories: &[Category]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "DESCRIPTION", "COLOR", "CREATOR", "CREATED"]);
        for category in categories {
            let creator = category.creator.as_ref().and_then(|c| c.username.as_deref());
            table.add_row(row![
                category.category_id,
                category.name,
                text(category.description.as_deref()),
                text(category.color.as_deref()),
                text(creator),
                date(category.created_at)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn tasks(tasks: &[Task]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "TITLE", "STATUS", "PRIORITY", "CATEGORY", "ASSIGNEE", "DUE"]);
        for task in tasks {
            table.add_row(row![
                text(task.task_id.as_ref().map(ToString::to_string).as_deref()),
                text(task.title.as_deref()),
                text(task.status_str()),
                text(task.priority_str()),
                text(task.category_name()),
                text(task.assignee_name()),
                date(task.due_date)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn task(task: &Task) -> Result<()> {
        let mut table = Table::new();
        let creator = task.creator.as_ref().and_then(|c| c.username.as_deref());

        table.add_row(row!["ID", text(task.task_id.as_ref().map(ToString::to_string).as_deref())]);
        table.add_row(row!["TITLE", text(task.title.as_deref())]);
        table.add_row(row!["DESCRIPTION", text(task.description.as_deref())]);
        table.add_row(row!["STATUS", text(task.status_str())]);
        table.add_row(row!["PRIORITY", text(task.priority_str())]);
        table.add_row(row!["CATEGORY", text(task.category_name())]);
        table.add_row(row!["ASSIGNEE", text(task.assignee_name())]);
        table.add_row(row!["CREATOR", text(creator)]);
        table.add_row(row!["DUE", date(task.due_date)]);
        table.add_row(row!["CREATED", datetime(task.created_at)]);
        table.add_row(row!["UPDATED", datetime(task.updated_at)]);
        table.printstd();

        Ok(())
    }

    pub fn overview(overview: &SystemOverview) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["USERS", overview.users.total]);
        for (role, count) in overview.users.by_role.iter() {
            table.add_row(row![format!("  {}", role), count]);
        }
        table.add_row(row!["TASKS", overview.tasks.total]);
        for (status, count) in overview.tasks.by_status.iter() {
            table.add_row(row![format!("  {}", status), count]);
        }
        for (priority, count) in overview.tasks.by_priority.iter() {
            table.add_row(row![format!("  {}", priority), count]);
        }
        table.add_row(row!["CATEGORIES", overview.categories.total]);
        table.printstd();

        if !overview.users.registration_trend.is_empty() {
            let mut trend = Table::new();
            trend.add_row(row!["MONTH", "REGISTRATIONS"]);
            for month in &overview.users.registration_trend {
                trend.add_row(row![month.month, month.count]);
            }
            trend.printstd();
        }

        Ok(())
    }

    pub fn trends(trends: &TaskTrends) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["DATE", "CREATED", "COMPLETED"]);
        for day in &trends.daily_trends {
            table.add_row(row![day.date, day.created, day.completed]);
        }
        table.add_row(row![
            "TOTAL",
            trends.summary.total_created,
            trends.summary.total_completed
        ]);
        table.printstd();

        Ok(())
    }

    pub fn workload(workload: &WorkloadStatistics) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row![
            "USER",
            "TOTAL",
            "DONE",
            "IN PROGRESS",
            "PENDING",
            "OVERDUE",
            "HIGH",
            "RATE"
        ]);
        for user in &workload.user_workloads {
            table.add_row(row![
                user.username,
                user.total,
                user.completed,
                user.in_progress,
                user.pending,
                user.overdue,
                user.high_priority,
                format!("{}%", user.completion_rate)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn category_statistics(stats: &CategoryStatistics) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "CATEGORY", "COLOR", "TASKS"]);
        for category in &stats.category_distribution {
            table.add_row(row![
                category.category_id,
                category.name,
                text(category.color.as_deref()),
                category.task_count
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn personal(stats: &PersonalStatistics) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["", "ASSIGNED", "CREATED"]);
        table.add_row(row!["Total", stats.assigned.total, stats.created.total]);
        table.add_row(row!["Completed", stats.assigned.completed, stats.created.completed]);
        table.add_row(row!["In progress", stats.assigned.in_progress, stats.created.in_progress]);
        table.add_row(row!["Pending", stats.assigned.pending, stats.created.pending]);
        table.add_row(row!["Overdue", stats.assigned.overdue, EMPTY]);
        table.add_row(row!["High priority", stats.assigned.high_priority, EMPTY]);
        table.add_row(row![
            "Completion rate",
            format!("{}%", stats.assigned.completion_rate),
            format!("{}%", stats.created.completion_rate)
        ]);
        table.printstd();

        Ok(())
    }
}
