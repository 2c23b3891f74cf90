//! Reporting aggregations over fetched rows.
//!
//! Every function here is pure: rows come in, summary structures go out, and
//! nothing touches the store. The repository layer in [`crate::db::reports`]
//! performs the fetches and hands the rows over.
//!
//! ## Rates
//!
//! ```text
//! completion_rate = round(100 * completed / total)    (0 when total == 0)
//! ```
//!
//! Rounding is half-up, so 1 of 8 completed reports 13%.
//!
//! ## Recognised values
//!
//! Role, status and priority histograms have a fixed bucket set. Rows whose
//! value is outside it still count toward `total` but land in no bucket, so
//! the buckets can sum to less than `total`. That is expected.
//!
//! ## Overdue
//!
//! The workload report counts tasks whose stored status is 已逾期. Personal
//! statistics instead count tasks whose due date has passed and which are not
//! completed, regardless of the stored status. The two numbers can disagree.

use super::category::Category;
use super::row_id::RowId;
use super::task::{Priority, Task, TaskStatus};
use super::user::{Role, User};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_TREND_DAYS: u32 = 30;
pub const RECENT_ACTIVITY_DAYS: i64 = 30;
pub const UNKNOWN_USERNAME: &str = "Unknown user";

/// `round(100 * part / total)` as an integer percentage, 0 when `total` is 0.
pub fn completion_rate(part: usize, total: usize) -> u32 {
    rounded_ratio(part * 100, total)
}

/// Integer division rounded half-up, 0 when `denominator` is 0.
fn rounded_ratio(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    ((2 * numerator + denominator) / (2 * denominator)) as u32
}

/// Counts per recognised value, in the order the values were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    buckets: Vec<(&'static str, usize)>,
}

impl Histogram {
    pub fn get(&self, key: &str) -> usize {
        self.buckets.iter().find(|(k, _)| *k == key).map_or(0, |(_, count)| *count)
    }

    pub fn sum(&self) -> usize {
        self.buckets.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.buckets.iter().copied()
    }
}

impl Serialize for Histogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (key, count) in &self.buckets {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// Counts rows whose field equals each recognised value. Unrecognised and
/// missing values are skipped.
pub fn count_by_key<T, F>(rows: &[T], field: F, recognized: &[&'static str]) -> Histogram
where
    F: Fn(&T) -> Option<&str>,
{
    let mut buckets: Vec<(&'static str, usize)> = recognized.iter().map(|key| (*key, 0)).collect();
    for row in rows {
        if let Some(value) = field(row) {
            if let Some(bucket) = buckets.iter_mut().find(|(key, _)| *key == value) {
                bucket.1 += 1;
            }
        }
    }
    Histogram { buckets }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    pub total: usize,
    pub by_role: Histogram,
    pub registration_trend: Vec<MonthlyCount>,
}

pub fn user_statistics(users: &[User]) -> UserStatistics {
    let mut monthly: BTreeMap<String, usize> = BTreeMap::new();
    for created_at in users.iter().filter_map(|user| user.created_at) {
        *monthly.entry(created_at.format("%Y-%m").to_string()).or_default() += 1;
    }

    UserStatistics {
        total: users.len(),
        by_role: count_by_key(users, |user| Some(user.role.as_str()), &Role::RECOGNIZED),
        registration_trend: monthly.into_iter().map(|(month, count)| MonthlyCount { month, count }).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatistics {
    pub total: usize,
    pub by_status: Histogram,
    pub by_priority: Histogram,
}

pub fn task_statistics(tasks: &[Task]) -> TaskStatistics {
    TaskStatistics {
        total: tasks.len(),
        by_status: count_by_key(tasks, Task::status_str, &TaskStatus::RECOGNIZED),
        by_priority: count_by_key(tasks, Task::priority_str, &Priority::RECOGNIZED),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category_id: RowId,
    pub name: String,
    pub color: Option<String>,
    pub task_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatistics {
    pub total: usize,
    pub category_distribution: Vec<CategoryCount>,
    pub most_used_category: Option<CategoryCount>,
}

/// Task count per category. The most used category is the first one with
/// the highest count, and `None` only when there are no categories.
pub fn category_statistics(categories: &[Category], tasks: &[Task]) -> CategoryStatistics {
    let distribution: Vec<CategoryCount> = categories
        .iter()
        .map(|category| CategoryCount {
            category_id: category.category_id.clone(),
            name: category.name.clone(),
            color: category.color.clone(),
            task_count: tasks
                .iter()
                .filter(|task| task.category_id.as_ref() == Some(&category.category_id))
                .count(),
        })
        .collect();

    let mut most_used: Option<&CategoryCount> = None;
    for current in &distribution {
        match most_used {
            Some(max) if current.task_count <= max.task_count => {}
            _ => most_used = Some(current),
        }
    }

    CategoryStatistics {
        total: categories.len(),
        most_used_category: most_used.cloned(),
        category_distribution: distribution,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub created: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub total_created: usize,
    pub total_completed: usize,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTrends {
    pub period_days: u32,
    pub daily_trends: Vec<DailyTrend>,
    pub summary: TrendSummary,
}

/// Start of the trailing window of `days` days ending at `now`.
pub fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days))
}

/// Buckets tasks by the calendar date of `created_at`.
///
/// `completed` counts tasks created that day whose current status is
/// completed; there is no completion timestamp. Tasks without a readable
/// `created_at` are left out of both the buckets and the totals.
pub fn task_trends(tasks: &[Task], days: u32) -> TaskTrends {
    let mut daily: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for task in tasks {
        let Some(created_at) = task.created_at else {
            continue;
        };
        let entry = daily.entry(created_at.date_naive()).or_default();
        entry.0 += 1;
        if task.is_completed() {
            entry.1 += 1;
        }
    }

    let daily_trends: Vec<DailyTrend> = daily
        .into_iter()
        .map(|(date, (created, completed))| DailyTrend { date, created, completed })
        .collect();
    let total_created = daily_trends.iter().map(|day| day.created).sum();
    let total_completed = daily_trends.iter().map(|day| day.completed).sum();

    TaskTrends {
        period_days: days,
        daily_trends,
        summary: TrendSummary {
            total_created,
            total_completed,
            completion_rate: completion_rate(total_completed, total_created),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWorkload {
    pub user_id: RowId,
    pub username: String,
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub overdue: usize,
    pub high_priority: usize,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSummary {
    pub total_assigned_tasks: usize,
    pub unassigned_tasks: usize,
    pub average_tasks_per_user: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStatistics {
    pub user_workloads: Vec<UserWorkload>,
    pub summary: WorkloadSummary,
}

/// Per-assignee breakdown by stored status. Users appear in the order their
/// first task was seen; unassigned tasks only feed the summary.
pub fn workload_statistics(tasks: &[Task]) -> WorkloadStatistics {
    let mut workloads: Vec<UserWorkload> = Vec::new();
    let mut index: HashMap<&RowId, usize> = HashMap::new();
    let mut unassigned = 0;

    for task in tasks {
        let Some(assignee_id) = task.assignee_id.as_ref() else {
            unassigned += 1;
            continue;
        };
        let position = *index.entry(assignee_id).or_insert_with(|| {
            workloads.push(UserWorkload {
                user_id: assignee_id.clone(),
                username: task.assignee_name().unwrap_or(UNKNOWN_USERNAME).to_string(),
                total: 0,
                completed: 0,
                in_progress: 0,
                pending: 0,
                overdue: 0,
                high_priority: 0,
                completion_rate: 0,
            });
            workloads.len() - 1
        });

        let workload = &mut workloads[position];
        workload.total += 1;
        match task.status {
            Some(TaskStatus::Completed) => workload.completed += 1,
            Some(TaskStatus::InProgress) => workload.in_progress += 1,
            Some(TaskStatus::Pending) => workload.pending += 1,
            Some(TaskStatus::Overdue) => workload.overdue += 1,
            _ => {}
        }
        if task.priority == Some(Priority::High) {
            workload.high_priority += 1;
        }
    }

    for workload in &mut workloads {
        workload.completion_rate = completion_rate(workload.completed, workload.total);
    }

    let total_assigned_tasks = tasks.len() - unassigned;
    WorkloadStatistics {
        summary: WorkloadSummary {
            total_assigned_tasks,
            unassigned_tasks: unassigned,
            average_tasks_per_user: rounded_ratio(total_assigned_tasks, workloads.len()),
        },
        user_workloads: workloads,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    /// Past-due and not completed, computed against `now`.
    pub overdue: usize,
    pub high_priority: usize,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    #[serde(rename = "assignedLast30Days")]
    pub assigned_last_30_days: usize,
    #[serde(rename = "completedLast30Days")]
    pub completed_last_30_days: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalStatistics {
    pub assigned: AssignedStats,
    pub created: CreatedStats,
    pub recent_activity: RecentActivity,
}

fn count_status(tasks: &[Task], status: TaskStatus) -> usize {
    tasks.iter().filter(|task| task.status.as_ref() == Some(&status)).count()
}

/// Statistics for one user from the tasks assigned to them and the tasks they created.
pub fn personal_statistics(assigned: &[Task], created: &[Task], now: DateTime<Utc>) -> PersonalStatistics {
    let assigned_completed = count_status(assigned, TaskStatus::Completed);
    let created_completed = count_status(created, TaskStatus::Completed);

    let recent_since = now - Duration::days(RECENT_ACTIVITY_DAYS);
    let recent: Vec<&Task> = assigned
        .iter()
        .filter(|task| matches!(task.created_at, Some(created_at) if created_at >= recent_since))
        .collect();

    PersonalStatistics {
        assigned: AssignedStats {
            total: assigned.len(),
            completed: assigned_completed,
            in_progress: count_status(assigned, TaskStatus::InProgress),
            pending: count_status(assigned, TaskStatus::Pending),
            overdue: assigned.iter().filter(|task| task.is_past_due(now)).count(),
            high_priority: assigned.iter().filter(|task| task.priority == Some(Priority::High)).count(),
            completion_rate: completion_rate(assigned_completed, assigned.len()),
        },
        created: CreatedStats {
            total: created.len(),
            completed: created_completed,
            in_progress: count_status(created, TaskStatus::InProgress),
            pending: count_status(created, TaskStatus::Pending),
            completion_rate: completion_rate(created_completed, created.len()),
        },
        recent_activity: RecentActivity {
            assigned_last_30_days: recent.len(),
            completed_last_30_days: recent.iter().filter(|task| task.is_completed()).count(),
        },
    }
}

/// Dashboard snapshot combining the three global statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemOverview {
    pub users: UserStatistics,
    pub tasks: TaskStatistics,
    pub categories: CategoryStatistics,
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::user::UserRef;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn task(status: TaskStatus) -> Task {
        Task {
            status: Some(status),
            ..Default::default()
        }
    }

    fn assigned(id: i64, name: &str, status: TaskStatus, priority: Priority) -> Task {
        Task {
            assignee_id: Some(RowId::Int(id)),
            assigned_user: Some(UserRef {
                user_id: Some(RowId::Int(id)),
                username: Some(name.to_string()),
            }),
            status: Some(status),
            priority: Some(priority),
            ..Default::default()
        }
    }

    fn category(id: i64, name: &str) -> Category {
        Category {
            category_id: RowId::Int(id),
            name: name.to_string(),
            description: None,
            color: Some("#007bff".to_string()),
            creator_id: None,
            creator: None,
            created_at: None,
        }
    }

    #[test]
    fn completion_rate_bounds() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(0, 7), 0);
        assert_eq!(completion_rate(7, 7), 100);
        assert_eq!(completion_rate(6, 10), 60);
        assert_eq!(completion_rate(1, 8), 13);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
    }

    #[test]
    fn histogram_skips_unrecognized_values() {
        let tasks = vec![
            task(TaskStatus::Pending),
            task(TaskStatus::Completed),
            task(TaskStatus::Other("archived".to_string())),
            Task::default(),
        ];
        let stats = task_statistics(&tasks);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status.get(crate::libs::task::STATUS_PENDING), 1);
        assert_eq!(stats.by_status.get(crate::libs::task::STATUS_COMPLETED), 1);
        assert_eq!(stats.by_status.sum(), 2);
        assert!(stats.by_status.sum() <= stats.total);
        assert_eq!(stats.by_priority.sum(), 0);
    }

    #[test]
    fn histogram_serializes_in_recognized_order() {
        let stats = task_statistics(&[task(TaskStatus::Overdue)]);
        let json = serde_json::to_string(&stats.by_status).unwrap();
        assert_eq!(json, r#"{"待领取":0,"进行中":0,"已完成":0,"已逾期":1}"#);
    }

    #[test]
    fn user_statistics_groups_registrations_by_month() {
        let user = |id: i64, role: Role, created: DateTime<Utc>| User {
            user_id: RowId::Int(id),
            username: format!("u{}", id),
            role,
            created_at: Some(created),
        };
        let users = vec![
            user(1, Role::Admin, at(2024, 2, 3, 9)),
            user(2, Role::User, at(2024, 1, 20, 9)),
            user(3, Role::User, at(2024, 2, 28, 9)),
        ];
        let stats = user_statistics(&users);
        assert_eq!(stats.by_role.get("admin"), 1);
        assert_eq!(stats.by_role.get("user"), 2);
        assert_eq!(
            stats.registration_trend,
            vec![
                MonthlyCount { month: "2024-01".to_string(), count: 1 },
                MonthlyCount { month: "2024-02".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn most_used_category_prefers_first_on_ties() {
        let categories = vec![category(1, "Backend"), category(2, "Frontend"), category(3, "Ops")];
        let in_category = |id: i64| Task {
            category_id: Some(RowId::Int(id)),
            ..Default::default()
        };
        let tasks = vec![in_category(2), in_category(3), in_category(3), in_category(2), in_category(9)];
        let stats = category_statistics(&categories, &tasks);
        assert_eq!(stats.total, 3);
        let counts: Vec<usize> = stats.category_distribution.iter().map(|c| c.task_count).collect();
        assert_eq!(counts, vec![0, 2, 2]);
        assert_eq!(stats.most_used_category.unwrap().name, "Frontend");
    }

    #[test]
    fn most_used_category_is_none_without_categories() {
        let stats = category_statistics(&[], &[Task::default()]);
        assert!(stats.most_used_category.is_none());
        let stats = category_statistics(&[category(1, "Empty")], &[]);
        assert_eq!(stats.most_used_category.unwrap().task_count, 0);
    }

    #[test]
    fn trends_for_ten_tasks_created_today() {
        let today = at(2024, 6, 1, 10);
        let tasks: Vec<Task> = (0..10)
            .map(|i| Task {
                created_at: Some(today),
                status: Some(if i < 6 { TaskStatus::Completed } else { TaskStatus::InProgress }),
                ..Default::default()
            })
            .collect();
        let trends = task_trends(&tasks, 7);
        assert_eq!(
            trends.daily_trends,
            vec![DailyTrend {
                date: today.date_naive(),
                created: 10,
                completed: 6
            }]
        );
        assert_eq!(
            trends.summary,
            TrendSummary {
                total_created: 10,
                total_completed: 6,
                completion_rate: 60
            }
        );
    }

    #[test]
    fn trends_are_sorted_and_sum_to_totals() {
        let created = |day: u32, status: TaskStatus| Task {
            created_at: Some(at(2024, 6, day, 23)),
            status: Some(status),
            ..Default::default()
        };
        let tasks = vec![
            created(5, TaskStatus::Completed),
            created(2, TaskStatus::Pending),
            created(5, TaskStatus::Pending),
            created(3, TaskStatus::Completed),
            created(2, TaskStatus::Completed),
        ];
        let trends = task_trends(&tasks, 30);
        let dates: Vec<NaiveDate> = trends.daily_trends.iter().map(|d| d.date).collect();
        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(trends.daily_trends.iter().map(|d| d.created).sum::<usize>(), trends.summary.total_created);
        assert_eq!(trends.daily_trends.iter().map(|d| d.completed).sum::<usize>(), trends.summary.total_completed);
        assert_eq!(trends.summary.completion_rate, 60);
    }

    #[test]
    fn empty_window_gives_zero_summary() {
        let trends = task_trends(&[], DEFAULT_TREND_DAYS);
        assert!(trends.daily_trends.is_empty());
        assert_eq!(trends.summary.total_created, 0);
        assert_eq!(trends.summary.completion_rate, 0);
    }

    #[test]
    fn workload_groups_by_assignee() {
        let tasks = vec![
            assigned(1, "alice", TaskStatus::Completed, Priority::High),
            assigned(2, "bob", TaskStatus::InProgress, Priority::Low),
            assigned(1, "alice", TaskStatus::Overdue, Priority::Medium),
            assigned(1, "alice", TaskStatus::Pending, Priority::High),
            Task::default(),
            task(TaskStatus::Pending),
        ];
        let stats = workload_statistics(&tasks);
        assert_eq!(stats.user_workloads.len(), 2);

        let alice = &stats.user_workloads[0];
        assert_eq!(alice.username, "alice");
        assert_eq!((alice.total, alice.completed, alice.overdue, alice.pending), (3, 1, 1, 1));
        assert_eq!(alice.high_priority, 2);
        assert_eq!(alice.completion_rate, 33);

        assert_eq!(stats.summary.total_assigned_tasks, 4);
        assert_eq!(stats.summary.unassigned_tasks, 2);
        assert_eq!(stats.summary.total_assigned_tasks + stats.summary.unassigned_tasks, tasks.len());
        assert_eq!(stats.summary.average_tasks_per_user, 2);
    }

    #[test]
    fn workload_without_assignees_averages_to_zero() {
        let stats = workload_statistics(&[task(TaskStatus::Pending)]);
        assert!(stats.user_workloads.is_empty());
        assert_eq!(stats.summary.average_tasks_per_user, 0);
    }

    #[test]
    fn workload_names_missing_users() {
        let mut orphan = assigned(7, "ghost", TaskStatus::Pending, Priority::Low);
        orphan.assigned_user = None;
        let stats = workload_statistics(&[orphan]);
        assert_eq!(stats.user_workloads[0].username, UNKNOWN_USERNAME);
    }

    #[test]
    fn personal_overdue_is_time_derived() {
        let now = at(2024, 6, 30, 12);
        let due = |day: u32, status: TaskStatus| Task {
            status: Some(status),
            due_date: Some(at(2024, 6, day, 0)),
            created_at: Some(at(2024, 6, 1, 9)),
            ..Default::default()
        };
        let assigned_tasks = vec![
            due(10, TaskStatus::InProgress),
            due(10, TaskStatus::Completed),
            due(29, TaskStatus::Overdue),
            Task {
                status: Some(TaskStatus::Overdue),
                created_at: Some(at(2024, 1, 1, 9)),
                ..Default::default()
            },
        ];
        let stats = personal_statistics(&assigned_tasks, &[], now);
        assert_eq!(stats.assigned.overdue, 2);
        assert_eq!(stats.assigned.total, 4);
        assert_eq!(stats.assigned.completion_rate, 25);
        assert_eq!(stats.recent_activity.assigned_last_30_days, 3);
        assert_eq!(stats.recent_activity.completed_last_30_days, 1);
        assert_eq!(stats.created.total, 0);
        assert_eq!(stats.created.completion_rate, 0);
    }

    #[test]
    fn personal_created_breakdown() {
        let created = vec![
            task(TaskStatus::Completed),
            task(TaskStatus::Pending),
            task(TaskStatus::InProgress),
            task(TaskStatus::Completed),
        ];
        let stats = personal_statistics(&[], &created, at(2024, 6, 30, 12));
        assert_eq!(
            stats.created,
            CreatedStats {
                total: 4,
                completed: 2,
                in_progress: 1,
                pending: 1,
                completion_rate: 50
            }
        );
    }
}
