/// Every user-facing text in the application.
///
/// Library validation and authorization errors carry one of these so the
/// caller can both match on the variant and display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // === AUTHENTICATION MESSAGES ===
    InvalidCredentials,
    LoggedIn { username: String, role: String },
    LoggedOut,
    NotLoggedIn,
    AdminRequired,
    SessionUser { username: String, role: String },

    // === VALIDATION MESSAGES ===
    FieldRequired(String), // field name
    PasswordTooShort(usize),
    PasswordConfirmationMismatch,
    PasswordUnchanged,
    CurrentPasswordIncorrect,
    UsernameUnchanged,
    UsernameAvailable,
    UsernameTaken,

    // === USER MESSAGES ===
    UserCreated(String),
    UserUpdated(String),
    UserDeleted(String),
    UsersNotFound,
    ConfirmDeleteUser(String),
    UsernameChanged(String),
    PasswordChanged,
    ProfileHeader,
    EditingUser(String),
    BootstrapAdmin,

    // === CATEGORY MESSAGES ===
    CategoryCreated(String),
    CategoryUpdated(String),
    CategoryDeleted(String),
    CategoriesNotFound,
    ConfirmDeleteCategory(String),
    EditingCategory(String),

    // === TASK MESSAGES ===
    TaskCreated(String),
    TaskUpdated(String),
    TaskDeleted(String),
    TasksNotFound,
    ConfirmDeleteTask(String),
    TaskAlreadyAssigned,
    TaskStatusNotAssignee,
    TaskClaimed(String),
    TaskStatusChanged { title: String, status: String },
    EditingTask(String),

    // === REPORT MESSAGES ===
    OverviewHeader(String), // last updated
    TrendsHeader(u32),      // days
    TrendsEmpty(u32),
    TrendsSummary { created: usize, completed: usize, rate: u32 },
    WorkloadHeader,
    WorkloadSummary { assigned: usize, unassigned: usize, average: u32 },
    CategoriesHeader(usize),
    MostUsedCategory { name: String, count: usize },
    PersonalStatsHeader(String),
    RecentActivity { assigned: usize, completed: usize },

    // === STORE MESSAGES ===
    StoreReachable(String),
    StoreUnreachable(String),

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigModuleRemote,
    ConfigModuleLocal,
    RemoteConfigMissing,

    // === PROMPTS ===
    PromptUsername,
    PromptPassword,
    PromptPasswordKeep,
    PromptNewPassword,
    PromptConfirmPassword,
    PromptCurrentPassword,
    PromptRole,
    PromptCategoryName,
    PromptCategoryDescription,
    PromptCategoryColor,
    PromptTaskTitle,
    PromptTaskDescription,
    PromptTaskDueDate,
    PromptTaskStatus,
    PromptTaskPriority,
    PromptSelectCategory,
    PromptSelectBackend,
    PromptApiUrl,
    PromptApiKey,
    PromptDbFile,

    // === GENERAL MESSAGES ===
    OperationCancelled,
    NoChangesDetected,
    InvalidDate(String),
}
