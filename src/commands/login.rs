use super::{open_store, Output};
use crate::{
    db::users::Users,
    libs::{messages::Message, session::Session},
    msg_success,
};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Input, Password};

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username; prompted for when omitted
    username: Option<String>,
}

pub async fn cmd(login_args: LoginArgs, output: &Output) -> Result<()> {
    let username = match login_args.username {
        Some(username) => username,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptUsername.to_string())
            .interact_text()?,
    };
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptPassword.to_string())
        .interact()?;

    let store = open_store()?;
    let result = Users::new(&store).authenticate(username.trim(), &password).await;
    if let Ok(user) = &result {
        Session::save(user)?;
    }

    output.emit(result, |user| {
        msg_success!(Message::LoggedIn {
            username: user.username.clone(),
            role: user.role.to_string(),
        });
        Ok(())
    })
}
