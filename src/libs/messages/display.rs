//! Display implementation for taskboard messages.
//!
//! All user-facing text lives in this one match so wording stays consistent
//! between the library errors and the CLI output.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === AUTHENTICATION MESSAGES ===
            Message::InvalidCredentials => "Invalid username or password".to_string(),
            Message::LoggedIn { username, role } => format!("Logged in as {} ({})", username, role),
            Message::LoggedOut => "Logged out".to_string(),
            Message::NotLoggedIn => "You are not logged in. Run `taskboard login` first.".to_string(),
            Message::AdminRequired => "This action requires the admin role".to_string(),
            Message::SessionUser { username, role } => format!("Current user: {} ({})", username, role),

            // === VALIDATION MESSAGES ===
            Message::FieldRequired(field) => format!("{} is required", field),
            Message::PasswordTooShort(min) => format!("New password must be at least {} characters long", min),
            Message::PasswordConfirmationMismatch => "The new passwords do not match".to_string(),
            Message::PasswordUnchanged => "The new password must differ from the current one".to_string(),
            Message::CurrentPasswordIncorrect => "Current password is incorrect".to_string(),
            Message::UsernameUnchanged => "Username has not changed".to_string(),
            Message::UsernameAvailable => "Username is available".to_string(),
            Message::UsernameTaken => "Username is already taken".to_string(),

            // === USER MESSAGES ===
            Message::UserCreated(name) => format!("User '{}' created", name),
            Message::UserUpdated(name) => format!("User '{}' updated", name),
            Message::UserDeleted(name) => format!("User '{}' deleted", name),
            Message::UsersNotFound => "No users found".to_string(),
            Message::ConfirmDeleteUser(name) => format!("Delete user '{}'? This cannot be undone.", name),
            Message::UsernameChanged(name) => format!("Username changed to '{}'", name),
            Message::PasswordChanged => "Password changed".to_string(),
            Message::ProfileHeader => "Profile".to_string(),
            Message::EditingUser(name) => format!("Editing user '{}'", name),
            Message::BootstrapAdmin => "No users yet. Create the first admin account.".to_string(),

            // === CATEGORY MESSAGES ===
            Message::CategoryCreated(name) => format!("Category '{}' created", name),
            Message::CategoryUpdated(name) => format!("Category '{}' updated", name),
            Message::CategoryDeleted(name) => format!("Category '{}' deleted", name),
            Message::CategoriesNotFound => "No categories found".to_string(),
            Message::ConfirmDeleteCategory(name) => {
                format!("Delete category '{}'? Tasks in this category will lose their category.", name)
            }
            Message::EditingCategory(name) => format!("Editing category '{}'", name),

            // === TASK MESSAGES ===
            Message::TaskCreated(title) => format!("Task '{}' created", title),
            Message::TaskUpdated(title) => format!("Task '{}' updated", title),
            Message::TaskDeleted(title) => format!("Task '{}' deleted", title),
            Message::TasksNotFound => "No tasks found".to_string(),
            Message::ConfirmDeleteTask(title) => format!("Delete task '{}'?", title),
            Message::TaskAlreadyAssigned => "Task is already assigned to another user".to_string(),
            Message::TaskStatusNotAssignee => "You can only update the status of tasks assigned to you".to_string(),
            Message::TaskClaimed(title) => format!("Task '{}' claimed", title),
            Message::TaskStatusChanged { title, status } => format!("Task '{}' is now {}", title, status),
            Message::EditingTask(title) => format!("Editing task '{}'", title),

            // === REPORT MESSAGES ===
            Message::OverviewHeader(updated) => format!("System overview (updated {})", updated),
            Message::TrendsHeader(days) => format!("Task trends for the last {} days", days),
            Message::TrendsEmpty(days) => format!("No tasks created in the last {} days", days),
            Message::TrendsSummary { created, completed, rate } => {
                format!("Created: {}, completed: {}, completion rate: {}%", created, completed, rate)
            }
            Message::WorkloadHeader => "Workload per user".to_string(),
            Message::WorkloadSummary {
                assigned,
                unassigned,
                average,
            } => format!(
                "Assigned tasks: {}, unassigned tasks: {}, average per user: {}",
                assigned, unassigned, average
            ),
            Message::CategoriesHeader(total) => format!("Categories: {}", total),
            Message::MostUsedCategory { name, count } => format!("Most used category: {} ({} tasks)", name, count),
            Message::PersonalStatsHeader(name) => format!("Statistics for {}", name),
            Message::RecentActivity { assigned, completed } => {
                format!("Last 30 days: {} assigned, {} completed", assigned, completed)
            }

            // === STORE MESSAGES ===
            Message::StoreReachable(location) => format!("Store reachable at {}", location),
            Message::StoreUnreachable(error) => format!("Store connection failed: {}", error),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration and session removed".to_string(),
            Message::ConfigModuleRemote => "Remote store settings".to_string(),
            Message::ConfigModuleLocal => "Local store settings".to_string(),
            Message::RemoteConfigMissing => {
                "Remote store is not configured. Run `taskboard init` or set TASKBOARD_API_URL and TASKBOARD_API_KEY.".to_string()
            }

            // === PROMPTS ===
            Message::PromptUsername => "Username".to_string(),
            Message::PromptPassword => "Password".to_string(),
            Message::PromptPasswordKeep => "New password (leave empty to keep)".to_string(),
            Message::PromptNewPassword => "New password".to_string(),
            Message::PromptConfirmPassword => "Confirm new password".to_string(),
            Message::PromptCurrentPassword => "Current password".to_string(),
            Message::PromptRole => "Role".to_string(),
            Message::PromptCategoryName => "Category name".to_string(),
            Message::PromptCategoryDescription => "Description (optional)".to_string(),
            Message::PromptCategoryColor => "Color".to_string(),
            Message::PromptTaskTitle => "Task title".to_string(),
            Message::PromptTaskDescription => "Description (optional)".to_string(),
            Message::PromptTaskDueDate => "Due date YYYY-MM-DD (optional)".to_string(),
            Message::PromptTaskStatus => "Status".to_string(),
            Message::PromptTaskPriority => "Priority".to_string(),
            Message::PromptSelectCategory => "Category".to_string(),
            Message::PromptSelectBackend => "Select the row store backend".to_string(),
            Message::PromptApiUrl => "Enter the store API URL".to_string(),
            Message::PromptApiKey => "Enter the store API key".to_string(),
            Message::PromptDbFile => "Enter the local database file name".to_string(),

            // === GENERAL MESSAGES ===
            Message::OperationCancelled => "Operation cancelled".to_string(),
            Message::NoChangesDetected => "No changes detected.".to_string(),
            Message::InvalidDate(value) => format!("'{}' is not a valid date (expected YYYY-MM-DD)", value),
        };

        write!(f, "{}", text)
    }
}
