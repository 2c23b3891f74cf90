//! Command-line interface.
//!
//! Each subcommand lives in its own module with a clap `Args` struct and a
//! `cmd` entry point. Commands that act on the store open it from the saved
//! configuration and identify the caller through the login session.

pub mod category;
pub mod init;
pub mod login;
pub mod logout;
pub mod ping;
pub mod profile;
pub mod report;
pub mod task;
pub mod user;
pub mod whoami;

use crate::api::Store;
use crate::libs::config::Config;
use crate::libs::error::Error;
use crate::libs::response::ApiResponse;
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configure the row store and create the first admin")]
    Init(init::InitArgs),
    #[command(about = "Log in")]
    Login(login::LoginArgs),
    #[command(about = "Log out")]
    Logout,
    #[command(about = "Show the logged-in user")]
    Whoami,
    #[command(about = "Check the connection to the row store")]
    Ping,
    #[command(about = "Manage user accounts (admin)")]
    User(user::UserArgs),
    #[command(about = "Manage task categories")]
    Category(category::CategoryArgs),
    #[command(about = "List, claim and manage tasks")]
    Task(task::TaskArgs),
    #[command(about = "View or change your own profile")]
    Profile(profile::ProfileArgs),
    #[command(about = "Statistics and reports")]
    Report(report::ReportArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print results as a `{data, error}` JSON document
    #[arg(long, global = true)]
    json: bool,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        let output = Output { json: cli.json };
        match cli.command {
            Commands::Init(args) => init::cmd(args).await,
            Commands::Login(args) => login::cmd(args, &output).await,
            Commands::Logout => logout::cmd(),
            Commands::Whoami => whoami::cmd(&output),
            Commands::Ping => ping::cmd(&output).await,
            Commands::User(args) => user::cmd(args, &output).await,
            Commands::Category(args) => category::cmd(args, &output).await,
            Commands::Task(args) => task::cmd(args, &output).await,
            Commands::Profile(args) => profile::cmd(args, &output).await,
            Commands::Report(args) => report::cmd(args, &output).await,
        }
    }
}

/// Opens the store selected by the saved configuration.
pub fn open_store() -> Result<Store> {
    Ok(Store::from_config(&Config::load()?)?)
}

/// Output mode shared by all commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// In JSON mode prints the `{data, error}` envelope; otherwise renders the
    /// data or propagates the error.
    pub fn emit<T, F>(&self, result: Result<T, Error>, render: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce(&T) -> Result<()>,
    {
        if self.json {
            let response = ApiResponse::from(result);
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }
        render(&result?)
    }
}
