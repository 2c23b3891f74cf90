use super::{open_store, Output};
use crate::{
    api::RowStore,
    db::{categories::Categories, tasks::Tasks},
    libs::{
        auth,
        messages::Message,
        row_id::RowId,
        session::Session,
        task::{NewTask, Priority, TaskFilter, TaskStatus, TaskUpdate},
        user::User,
        view::View,
    },
    msg_bail_anyhow, msg_info, msg_print, msg_success,
};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    command: Option<TaskCommand>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl From<StatusArg> for TaskStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => TaskStatus::Pending,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Completed => TaskStatus::Completed,
            StatusArg::Overdue => TaskStatus::Overdue,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(priority: PriorityArg) -> Self {
        match priority {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Debug, Default, Args)]
struct ListFilters {
    /// Only tasks with this status
    #[arg(long, value_enum)]
    status: Option<StatusArg>,
    /// Only tasks with this priority
    #[arg(long, value_enum)]
    priority: Option<PriorityArg>,
    /// Only tasks in this category
    #[arg(long)]
    category: Option<RowId>,
    /// Only tasks assigned to this user
    #[arg(long)]
    assignee: Option<RowId>,
    /// Case-insensitive search in title and description
    #[arg(short, long)]
    search: Option<String>,
    /// Only tasks assigned to you
    #[arg(long, conflicts_with = "assignee")]
    mine: bool,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// List tasks, newest first
    List(ListFilters),
    /// Show one task
    Show { id: RowId },
    /// Create a task (admin)
    Create {
        /// Task title; prompted for when omitted
        title: Option<String>,
        /// Category ID; chosen from a list when omitted
        #[arg(short, long)]
        category: Option<RowId>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, value_enum)]
        priority: Option<PriorityArg>,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// Assign directly to this user
        #[arg(long)]
        assignee: Option<RowId>,
    },
    /// Edit a task (admin)
    Edit { id: RowId },
    /// Delete a task (admin)
    Delete {
        id: RowId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Assign an unclaimed task to yourself
    Claim { id: RowId },
    /// Change the status of a task assigned to you
    Status {
        id: RowId,
        #[arg(value_enum)]
        status: StatusArg,
    },
}

pub async fn cmd(args: TaskArgs, output: &Output) -> Result<()> {
    let command = args.command.unwrap_or(TaskCommand::List(ListFilters::default()));
    let user = Session::current()?;
    if matches!(
        command,
        TaskCommand::Create { .. } | TaskCommand::Edit { .. } | TaskCommand::Delete { .. }
    ) {
        auth::require_admin(&user)?;
    }

    let store = open_store()?;
    let tasks = Tasks::new(&store);
    match command {
        TaskCommand::List(filters) => handle_list(&tasks, &user, filters, output).await,
        TaskCommand::Show { id } => output.emit(tasks.get(&id).await, |task| View::task(task)),
        TaskCommand::Create {
            title,
            category,
            description,
            priority,
            due,
            assignee,
        } => {
            let title = match title {
                Some(title) => title,
                None => Input::with_theme(&ColorfulTheme::default())
                    .with_prompt(Message::PromptTaskTitle.to_string())
                    .interact_text()?,
            };
            let category_id = match category {
                Some(category_id) => category_id,
                None => select_category(&store).await?,
            };
            let mut task = NewTask::new(&title, category_id, user.user_id.clone());
            task.description = description.filter(|d| !d.trim().is_empty());
            task.priority = priority.map(Priority::from).unwrap_or_default();
            task.due_date = due.as_deref().map(parse_date).transpose()?;
            task.assignee_id = assignee;

            output.emit(tasks.create(&task).await, |task| {
                msg_success!(Message::TaskCreated(task.title.clone().unwrap_or_default()));
                Ok(())
            })
        }
        TaskCommand::Edit { id } => handle_edit(&tasks, id, output).await,
        TaskCommand::Delete { id, yes } => handle_delete(&tasks, id, yes, output).await,
        TaskCommand::Claim { id } => output.emit(tasks.claim(&id, &user.user_id).await, |task| {
            msg_success!(Message::TaskClaimed(task.title.clone().unwrap_or_default()));
            Ok(())
        }),
        TaskCommand::Status { id, status } => {
            let result = tasks.update_status(&id, &user.user_id, &status.into()).await;
            output.emit(result, |task| {
                msg_success!(Message::TaskStatusChanged {
                    title: task.title.clone().unwrap_or_default(),
                    status: task.status_str().unwrap_or_default().to_string(),
                });
                Ok(())
            })
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(_) => msg_bail_anyhow!(Message::InvalidDate(value.to_string())),
    }
}

async fn select_category<S: RowStore>(store: &S) -> Result<RowId> {
    let categories = Categories::new(store).list().await?;
    if categories.is_empty() {
        msg_bail_anyhow!(Message::CategoriesNotFound);
    }
    let names: Vec<&str> = categories.iter().map(|category| category.name.as_str()).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptSelectCategory.to_string())
        .items(&names)
        .default(0)
        .interact()?;
    Ok(categories[selection].category_id.clone())
}

async fn handle_list<S: RowStore>(tasks: &Tasks<'_, S>, user: &User, filters: ListFilters, output: &Output) -> Result<()> {
    let filter = TaskFilter {
        status: filters.status.map(TaskStatus::from),
        priority: filters.priority.map(Priority::from),
        category_id: filters.category,
        assignee_id: if filters.mine { Some(user.user_id.clone()) } else { filters.assignee },
        search: filters.search,
    };
    output.emit(tasks.list(&filter).await, |tasks| {
        if tasks.is_empty() {
            msg_info!(Message::TasksNotFound);
            return Ok(());
        }
        View::tasks(tasks)
    })
}

async fn handle_edit<S: RowStore>(tasks: &Tasks<'_, S>, id: RowId, output: &Output) -> Result<()> {
    let task = tasks.get(&id).await?;
    let title = task.title.clone().unwrap_or_default();
    msg_print!(Message::EditingTask(title.clone()), true);

    let new_title: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptTaskTitle.to_string())
        .default(title.clone())
        .interact_text()?;
    let description: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptTaskDescription.to_string())
        .default(task.description.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let statuses = TaskStatus::RECOGNIZED;
    let status_index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptTaskStatus.to_string())
        .items(&statuses)
        .default(statuses.iter().position(|s| Some(*s) == task.status_str()).unwrap_or(0))
        .interact()?;
    let priorities = Priority::RECOGNIZED;
    let priority_index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptTaskPriority.to_string())
        .items(&priorities)
        .default(priorities.iter().position(|p| Some(*p) == task.priority_str()).unwrap_or(1))
        .interact()?;
    let due: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptTaskDueDate.to_string())
        .default(task.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let description = Some(description).filter(|d| !d.trim().is_empty());
    let status = TaskStatus::from(statuses[status_index].to_string());
    let priority = Priority::from(priorities[priority_index].to_string());
    let due_date = Some(due.as_str()).filter(|d| !d.trim().is_empty()).map(parse_date).transpose()?;

    let update = TaskUpdate {
        title: (new_title != title).then_some(new_title),
        description: (description != task.description).then_some(description),
        status: (Some(&status) != task.status.as_ref()).then_some(status),
        priority: (Some(&priority) != task.priority.as_ref()).then_some(priority),
        due_date: (due_date != task.due_date.map(|d| d.date_naive())).then_some(due_date),
        ..Default::default()
    };
    if update.is_empty() {
        msg_info!(Message::NoChangesDetected);
        return Ok(());
    }

    output.emit(tasks.update(&id, &update).await, |task| {
        msg_success!(Message::TaskUpdated(task.title.clone().unwrap_or_default()));
        Ok(())
    })
}

async fn handle_delete<S: RowStore>(tasks: &Tasks<'_, S>, id: RowId, yes: bool, output: &Output) -> Result<()> {
    let task = tasks.get(&id).await?;
    let title = task.title.unwrap_or_default();
    if !yes
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteTask(title).to_string())
            .default(false)
            .interact()?
    {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    output.emit(tasks.delete(&id).await, |task| {
        msg_success!(Message::TaskDeleted(task.title.clone().unwrap_or_default()));
        Ok(())
    })
}
