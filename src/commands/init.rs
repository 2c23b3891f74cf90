//! Interactive setup.
//!
//! Runs the configuration wizard and, when the selected store has no users
//! yet, creates the first administrator so someone can log in.

use super::open_store;
use crate::{
    db::users::Users,
    libs::{
        config::{Config, CONFIG_FILE_NAME},
        data_storage::DataStorage,
        messages::Message,
        session::Session,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use std::fs;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Remove the saved configuration and login session instead
    #[arg(short, long)]
    delete: bool,
}

pub async fn cmd(init_args: InitArgs) -> Result<()> {
    if init_args.delete {
        let path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Session::clear()?;
        msg_info!(Message::ConfigDeleted);
        return Ok(());
    }

    Config::init()?.save()?;
    msg_success!(Message::ConfigSaved);

    let store = open_store()?;
    let users = Users::new(&store);
    if users.count().await? > 0 {
        return Ok(());
    }

    msg_print!(Message::BootstrapAdmin, true);
    let username: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptUsername.to_string())
        .default("admin".to_string())
        .interact_text()?;
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptPassword.to_string())
        .with_confirmation(Message::PromptConfirmPassword.to_string(), Message::PasswordConfirmationMismatch.to_string())
        .interact()?;

    if let Some(admin) = users.bootstrap_admin(&username, &password).await? {
        msg_success!(Message::UserCreated(admin.username));
    }
    Ok(())
}
