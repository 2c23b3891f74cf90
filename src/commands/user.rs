use super::{open_store, Output};
use crate::{
    api::RowStore,
    db::users::Users,
    libs::{
        messages::Message,
        row_id::RowId,
        session::Session,
        user::{NewUser, Role, UserUpdate},
        view::View,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    /// List all users
    List,
    /// Create a user
    Create {
        /// Username; prompted for when omitted
        username: Option<String>,
        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
    /// Edit a user's name, password or role
    Edit {
        /// User ID
        id: RowId,
    },
    /// Delete a user
    Delete {
        /// User ID
        id: RowId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn cmd(args: UserArgs, output: &Output) -> Result<()> {
    Session::admin()?;
    let store = open_store()?;
    let users = Users::new(&store);

    match args.command {
        UserCommand::List => handle_list(&users, output).await,
        UserCommand::Create { username, admin } => handle_create(&users, username, admin, output).await,
        UserCommand::Edit { id } => handle_edit(&users, id, output).await,
        UserCommand::Delete { id, yes } => handle_delete(&users, id, yes, output).await,
    }
}

async fn handle_list<S: RowStore>(users: &Users<'_, S>, output: &Output) -> Result<()> {
    output.emit(users.list().await, |users| {
        if users.is_empty() {
            msg_info!(Message::UsersNotFound);
            return Ok(());
        }
        View::users(users)
    })
}

async fn handle_create<S: RowStore>(
    users: &Users<'_, S>,
    username: Option<String>,
    admin: bool,
    output: &Output,
) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptUsername.to_string())
            .interact_text()?,
    };
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptPassword.to_string())
        .interact()?;
    let role = if admin { Role::Admin } else { Role::User };

    let result = users.create(&NewUser::new(&username, &password, role)).await;
    output.emit(result, |user| {
        msg_success!(Message::UserCreated(user.username.clone()));
        Ok(())
    })
}

async fn handle_edit<S: RowStore>(users: &Users<'_, S>, id: RowId, output: &Output) -> Result<()> {
    let user = users.get(&id).await?;
    msg_print!(Message::EditingUser(user.username.clone()), true);

    let username: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptUsername.to_string())
        .default(user.username.clone())
        .interact_text()?;
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptPasswordKeep.to_string())
        .allow_empty_password(true)
        .interact()?;
    let roles = Role::RECOGNIZED;
    let current = roles.iter().position(|role| *role == user.role.as_str()).unwrap_or(1);
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptRole.to_string())
        .items(&roles)
        .default(current)
        .interact()?;

    let update = UserUpdate {
        username: (username != user.username).then_some(username),
        password: Some(password),
        role: Some(Role::from(roles[selection].to_string())).filter(|role| *role != user.role),
    };
    let result = users.update(&id, &update).await;
    output.emit(result, |user| {
        msg_success!(Message::UserUpdated(user.username.clone()));
        Ok(())
    })
}

async fn handle_delete<S: RowStore>(
    users: &Users<'_, S>,
    id: RowId,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let user = users.get(&id).await?;
    if !yes
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteUser(user.username.clone()).to_string())
            .default(false)
            .interact()?
    {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    output.emit(users.delete(&id).await, |user| {
        msg_success!(Message::UserDeleted(user.username.clone()));
        Ok(())
    })
}
