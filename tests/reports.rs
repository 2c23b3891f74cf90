#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, Utc};
    use serde_json::{json, Value};
    use taskboard::api::{RowStore, Select, Table};
    use taskboard::db::categories::Categories;
    use taskboard::db::local::LocalStore;
    use taskboard::db::reports::Reports;
    use taskboard::db::tasks::Tasks;
    use taskboard::db::users::Users;
    use taskboard::libs::category::NewCategory;
    use taskboard::libs::row_id::RowId;
    use taskboard::libs::timestamp;
    use taskboard::libs::task::{NewTask, Priority, TaskStatus};
    use taskboard::libs::user::{NewUser, Role};
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};

    struct ReportTestContext {
        _temp_dir: TempDir,
        store: LocalStore,
    }

    impl AsyncTestContext for ReportTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            let store = LocalStore::open(temp_dir.path().join("taskboard.db")).unwrap();
            ReportTestContext {
                _temp_dir: temp_dir,
                store,
            }
        }
    }

    async fn user(store: &LocalStore, username: &str, role: Role) -> RowId {
        Users::new(store)
            .create(&NewUser::new(username, "secret1", role))
            .await
            .unwrap()
            .user_id
    }

    async fn category(store: &LocalStore, name: &str, creator: &RowId) -> RowId {
        Categories::new(store)
            .create(&NewCategory::new(name, None, None, creator.clone()))
            .await
            .unwrap()
            .category_id
    }

    struct TaskFields<'a> {
        category: &'a RowId,
        creator: &'a RowId,
        assignee: Option<&'a RowId>,
        status: TaskStatus,
        priority: Priority,
        due_date: Option<NaiveDate>,
    }

    async fn task(store: &LocalStore, fields: TaskFields<'_>) {
        let mut task = NewTask::new("task", fields.category.clone(), fields.creator.clone());
        task.assignee_id = fields.assignee.cloned();
        task.status = fields.status;
        task.priority = fields.priority;
        task.due_date = fields.due_date;
        Tasks::new(store).create(&task).await.unwrap();
    }

    fn simple<'a>(category: &'a RowId, creator: &'a RowId, status: TaskStatus) -> TaskFields<'a> {
        TaskFields {
            category,
            creator,
            assignee: None,
            status,
            priority: Priority::Medium,
            due_date: None,
        }
    }

    #[test_context(ReportTestContext)]
    #[tokio::test]
    async fn test_trends_for_tasks_created_today(ctx: &mut ReportTestContext) {
        let admin = user(&ctx.store, "admin", Role::Admin).await;
        let backend = category(&ctx.store, "Backend", &admin).await;
        for i in 0..10 {
            let status = if i < 6 { TaskStatus::Completed } else { TaskStatus::Pending };
            task(&ctx.store, simple(&backend, &admin, status)).await;
        }

        let trends = Reports::new(&ctx.store).task_trends(7).await.unwrap();

        assert_eq!(trends.period_days, 7);
        assert_eq!(trends.daily_trends.len(), 1);
        assert_eq!(trends.daily_trends[0].date, Utc::now().date_naive());
        assert_eq!(trends.daily_trends[0].created, 10);
        assert_eq!(trends.daily_trends[0].completed, 6);
        assert_eq!(trends.summary.total_created, 10);
        assert_eq!(trends.summary.total_completed, 6);
        assert_eq!(trends.summary.completion_rate, 60);
    }

    #[test_context(ReportTestContext)]
    #[tokio::test]
    async fn test_trends_leave_out_tasks_before_window(ctx: &mut ReportTestContext) {
        let admin = user(&ctx.store, "admin", Role::Admin).await;
        let backend = category(&ctx.store, "Backend", &admin).await;
        let old = json!({
            "title": "old",
            "status": "已完成",
            "priority": "medium",
            "category_id": Value::from(&backend),
            "creator_id": Value::from(&admin),
            "created_at": timestamp::format_timestamp(Utc::now() - Duration::days(40)),
        });
        ctx.store
            .insert(Table::Tasks, old.as_object().unwrap().clone(), &Select::all())
            .await
            .unwrap();
        task(&ctx.store, simple(&backend, &admin, TaskStatus::Pending)).await;

        let trends = Reports::new(&ctx.store).task_trends(30).await.unwrap();

        assert_eq!(trends.summary.total_created, 1);
        assert_eq!(trends.summary.total_completed, 0);
        assert_eq!(trends.daily_trends.len(), 1);
        assert_eq!(trends.daily_trends[0].date, Utc::now().date_naive());
    }

    #[test_context(ReportTestContext)]
    #[tokio::test]
    async fn test_workload_groups_by_assignee(ctx: &mut ReportTestContext) {
        let admin = user(&ctx.store, "admin", Role::Admin).await;
        let alice = user(&ctx.store, "alice", Role::User).await;
        let bob = user(&ctx.store, "bob", Role::User).await;
        let backend = category(&ctx.store, "Backend", &admin).await;

        for status in [TaskStatus::Completed, TaskStatus::Overdue, TaskStatus::InProgress] {
            let mut fields = simple(&backend, &admin, status);
            fields.assignee = Some(&alice);
            fields.priority = Priority::High;
            task(&ctx.store, fields).await;
        }
        let mut fields = simple(&backend, &admin, TaskStatus::Pending);
        fields.assignee = Some(&bob);
        task(&ctx.store, fields).await;
        task(&ctx.store, simple(&backend, &admin, TaskStatus::Pending)).await;
        task(&ctx.store, simple(&backend, &admin, TaskStatus::Pending)).await;

        let workload = Reports::new(&ctx.store).workload_statistics().await.unwrap();

        assert_eq!(workload.user_workloads.len(), 2);
        let first = &workload.user_workloads[0];
        assert_eq!(first.username, "alice");
        assert_eq!(first.total, 3);
        assert_eq!(first.completed, 1);
        assert_eq!(first.overdue, 1);
        assert_eq!(first.in_progress, 1);
        assert_eq!(first.high_priority, 3);
        assert_eq!(first.completion_rate, 33);
        assert_eq!(workload.user_workloads[1].username, "bob");
        assert_eq!(workload.user_workloads[1].pending, 1);

        assert_eq!(workload.summary.total_assigned_tasks, 4);
        assert_eq!(workload.summary.unassigned_tasks, 2);
        assert_eq!(workload.summary.average_tasks_per_user, 2);
    }

    #[test_context(ReportTestContext)]
    #[tokio::test]
    async fn test_personal_statistics_use_due_dates_for_overdue(ctx: &mut ReportTestContext) {
        let admin = user(&ctx.store, "admin", Role::Admin).await;
        let alice = user(&ctx.store, "alice", Role::User).await;
        let backend = category(&ctx.store, "Backend", &admin).await;
        let yesterday = (Utc::now() - Duration::days(1)).date_naive();

        let mut late = simple(&backend, &admin, TaskStatus::InProgress);
        late.assignee = Some(&alice);
        late.due_date = Some(yesterday);
        task(&ctx.store, late).await;

        let mut late_but_done = simple(&backend, &admin, TaskStatus::Completed);
        late_but_done.assignee = Some(&alice);
        late_but_done.due_date = Some(yesterday);
        task(&ctx.store, late_but_done).await;

        let mut stored_overdue = simple(&backend, &admin, TaskStatus::Overdue);
        stored_overdue.assignee = Some(&alice);
        task(&ctx.store, stored_overdue).await;

        task(&ctx.store, simple(&backend, &alice, TaskStatus::Pending)).await;

        let stats = Reports::new(&ctx.store).personal_statistics(&alice).await.unwrap();

        assert_eq!(stats.assigned.total, 3);
        assert_eq!(stats.assigned.completed, 1);
        assert_eq!(stats.assigned.in_progress, 1);
        assert_eq!(stats.assigned.overdue, 1);
        assert_eq!(stats.assigned.completion_rate, 33);
        assert_eq!(stats.created.total, 1);
        assert_eq!(stats.created.pending, 1);
        assert_eq!(stats.created.completion_rate, 0);
        assert_eq!(stats.recent_activity.assigned_last_30_days, 3);
        assert_eq!(stats.recent_activity.completed_last_30_days, 1);
    }

    #[test_context(ReportTestContext)]
    #[tokio::test]
    async fn test_system_overview(ctx: &mut ReportTestContext) {
        let admin = user(&ctx.store, "admin", Role::Admin).await;
        let alice = user(&ctx.store, "alice", Role::User).await;
        user(&ctx.store, "bob", Role::User).await;
        let backend = category(&ctx.store, "Backend", &admin).await;
        let frontend = category(&ctx.store, "Frontend", &admin).await;

        task(&ctx.store, simple(&backend, &admin, TaskStatus::Completed)).await;
        task(&ctx.store, simple(&frontend, &admin, TaskStatus::Pending)).await;
        let mut fields = simple(&frontend, &admin, TaskStatus::InProgress);
        fields.assignee = Some(&alice);
        fields.priority = Priority::High;
        task(&ctx.store, fields).await;

        let overview = Reports::new(&ctx.store).system_overview().await.unwrap();

        assert_eq!(overview.users.total, 3);
        assert_eq!(overview.users.by_role.get("admin"), 1);
        assert_eq!(overview.users.by_role.get("user"), 2);
        assert_eq!(overview.users.registration_trend.len(), 1);
        assert_eq!(overview.users.registration_trend[0].count, 3);

        assert_eq!(overview.tasks.total, 3);
        assert_eq!(overview.tasks.by_status.get("已完成"), 1);
        assert_eq!(overview.tasks.by_status.get("进行中"), 1);
        assert_eq!(overview.tasks.by_priority.get("high"), 1);
        assert_eq!(overview.tasks.by_priority.sum(), 3);

        assert_eq!(overview.categories.total, 2);
        let most_used = overview.categories.most_used_category.unwrap();
        assert_eq!(most_used.name, "Frontend");
        assert_eq!(most_used.task_count, 2);
    }

    #[test_context(ReportTestContext)]
    #[tokio::test]
    async fn test_task_statistics_for_one_user(ctx: &mut ReportTestContext) {
        let admin = user(&ctx.store, "admin", Role::Admin).await;
        let alice = user(&ctx.store, "alice", Role::User).await;
        let backend = category(&ctx.store, "Backend", &admin).await;

        let mut assigned = simple(&backend, &admin, TaskStatus::InProgress);
        assigned.assignee = Some(&alice);
        task(&ctx.store, assigned).await;
        task(&ctx.store, simple(&backend, &alice, TaskStatus::Pending)).await;
        task(&ctx.store, simple(&backend, &admin, TaskStatus::Pending)).await;

        let reports = Reports::new(&ctx.store);
        let mine = reports.task_statistics(Some(&alice)).await.unwrap();
        assert_eq!(mine.total, 2);
        assert_eq!(mine.by_status.get("进行中"), 1);
        assert_eq!(reports.task_statistics(None).await.unwrap().total, 3);
    }

    #[test_context(ReportTestContext)]
    #[tokio::test]
    async fn test_empty_store_reports(ctx: &mut ReportTestContext) {
        let reports = Reports::new(&ctx.store);

        let categories = reports.category_statistics().await.unwrap();
        assert_eq!(categories.total, 0);
        assert!(categories.most_used_category.is_none());

        let trends = reports.task_trends(30).await.unwrap();
        assert!(trends.daily_trends.is_empty());
        assert_eq!(trends.summary.completion_rate, 0);

        let workload = reports.workload_statistics().await.unwrap();
        assert!(workload.user_workloads.is_empty());
        assert_eq!(workload.summary.average_tasks_per_user, 0);
    }
}
