use super::{open_store, Output};
use crate::{
    db::users::Users,
    libs::{messages::Message, session::Session, view::View},
    msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Input, Password};

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    command: Option<ProfileCommand>,
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    /// Show your account
    Show,
    /// Change your username
    Rename {
        /// New username; prompted for when omitted
        username: Option<String>,
    },
    /// Change your password
    Passwd,
}

pub async fn cmd(args: ProfileArgs, output: &Output) -> Result<()> {
    let user = Session::current()?;
    let store = open_store()?;
    let users = Users::new(&store);

    match args.command.unwrap_or(ProfileCommand::Show) {
        ProfileCommand::Show => output.emit(users.get(&user.user_id).await, |user| {
            msg_print!(Message::ProfileHeader, true);
            View::user(user)
        }),
        ProfileCommand::Rename { username } => {
            let username = match username {
                Some(username) => username,
                None => Input::with_theme(&ColorfulTheme::default())
                    .with_prompt(Message::PromptUsername.to_string())
                    .default(user.username.clone())
                    .interact_text()?,
            };
            let result = users.update_profile(&user.user_id, &username).await;
            if let Ok(renamed) = &result {
                Session::save(renamed)?;
            }
            output.emit(result, |user| {
                msg_success!(Message::UsernameChanged(user.username.clone()));
                Ok(())
            })
        }
        ProfileCommand::Passwd => {
            let theme = ColorfulTheme::default();
            let current = Password::with_theme(&theme)
                .with_prompt(Message::PromptCurrentPassword.to_string())
                .allow_empty_password(true)
                .interact()?;
            let new = Password::with_theme(&theme)
                .with_prompt(Message::PromptNewPassword.to_string())
                .allow_empty_password(true)
                .interact()?;
            let confirm = Password::with_theme(&theme)
                .with_prompt(Message::PromptConfirmPassword.to_string())
                .allow_empty_password(true)
                .interact()?;

            let result = users.change_password(&user.user_id, &current, &new, &confirm).await;
            output.emit(result, |_| {
                msg_success!(Message::PasswordChanged);
                Ok(())
            })
        }
    }
}
