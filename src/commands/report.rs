use super::{open_store, Output};
use crate::{
    db::reports::Reports,
    libs::{
        auth,
        messages::Message,
        session::Session,
        stats::{TaskStatistics, DEFAULT_TREND_DAYS},
        view::View,
    },
    msg_info, msg_print,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use prettytable::{row, Table};

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    command: Option<ReportCommand>,
}

#[derive(Debug, Subcommand)]
enum ReportCommand {
    /// User, task and category totals (admin)
    Overview,
    /// Task counts by status and priority
    Tasks {
        /// Only tasks you are assigned to or created
        #[arg(long)]
        mine: bool,
    },
    /// Tasks created and completed per day
    Trends {
        /// Number of days to look back
        #[arg(short, long, default_value_t = DEFAULT_TREND_DAYS)]
        days: u32,
    },
    /// Task load per assignee (admin)
    Workload,
    /// Task count per category
    Categories,
    /// Your own task statistics
    Personal,
}

pub async fn cmd(args: ReportArgs, output: &Output) -> Result<()> {
    let command = args.command.unwrap_or(ReportCommand::Personal);
    let user = Session::current()?;
    if matches!(command, ReportCommand::Overview | ReportCommand::Workload) {
        auth::require_admin(&user)?;
    }

    let store = open_store()?;
    let reports = Reports::new(&store);
    match command {
        ReportCommand::Overview => output.emit(reports.system_overview().await, |overview| {
            let updated = overview.last_updated.format("%Y-%m-%d %H:%M:%S").to_string();
            msg_print!(Message::OverviewHeader(updated), true);
            View::overview(overview)
        }),
        ReportCommand::Tasks { mine } => {
            let user_id = mine.then_some(&user.user_id);
            output.emit(reports.task_statistics(user_id).await, render_task_statistics)
        }
        ReportCommand::Trends { days } => output.emit(reports.task_trends(days).await, |trends| {
            msg_print!(Message::TrendsHeader(trends.period_days), true);
            if trends.daily_trends.is_empty() {
                msg_info!(Message::TrendsEmpty(trends.period_days));
                return Ok(());
            }
            View::trends(trends)?;
            msg_print!(Message::TrendsSummary {
                created: trends.summary.total_created,
                completed: trends.summary.total_completed,
                rate: trends.summary.completion_rate,
            });
            Ok(())
        }),
        ReportCommand::Workload => output.emit(reports.workload_statistics().await, |workload| {
            msg_print!(Message::WorkloadHeader, true);
            if !workload.user_workloads.is_empty() {
                View::workload(workload)?;
            }
            msg_print!(Message::WorkloadSummary {
                assigned: workload.summary.total_assigned_tasks,
                unassigned: workload.summary.unassigned_tasks,
                average: workload.summary.average_tasks_per_user,
            });
            Ok(())
        }),
        ReportCommand::Categories => output.emit(reports.category_statistics().await, |stats| {
            msg_print!(Message::CategoriesHeader(stats.total), true);
            if stats.category_distribution.is_empty() {
                msg_info!(Message::CategoriesNotFound);
                return Ok(());
            }
            View::category_statistics(stats)?;
            if let Some(most_used) = &stats.most_used_category {
                msg_print!(Message::MostUsedCategory {
                    name: most_used.name.clone(),
                    count: most_used.task_count,
                });
            }
            Ok(())
        }),
        ReportCommand::Personal => output.emit(reports.personal_statistics(&user.user_id).await, |stats| {
            msg_print!(Message::PersonalStatsHeader(user.username.clone()), true);
            View::personal(stats)?;
            msg_print!(Message::RecentActivity {
                assigned: stats.recent_activity.assigned_last_30_days,
                completed: stats.recent_activity.completed_last_30_days,
            });
            Ok(())
        }),
    }
}

fn render_task_statistics(stats: &TaskStatistics) -> Result<()> {
    let mut table = Table::new();

    table.add_row(row!["TOTAL", stats.total]);
    for (status, count) in stats.by_status.iter() {
        table.add_row(row![status, count]);
    }
    for (priority, count) in stats.by_priority.iter() {
        table.add_row(row![priority, count]);
    }
    table.printstd();

    Ok(())
}
