use super::{open_store, Output};
use crate::{
    api::RowStore,
    db::categories::Categories,
    libs::{
        auth,
        category::{CategoryUpdate, NewCategory, DEFAULT_COLOR, PALETTE},
        messages::Message,
        row_id::RowId,
        session::Session,
        view::View,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

#[derive(Debug, Args)]
pub struct CategoryArgs {
    #[command(subcommand)]
    command: Option<CategoryCommand>,
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    /// List all categories
    List,
    /// Create a category (admin)
    Create {
        /// Category name; prompted for when omitted
        name: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Color as a hex code
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Edit a category (admin)
    Edit {
        /// Category ID
        id: RowId,
    },
    /// Delete a category (admin)
    Delete {
        /// Category ID
        id: RowId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn cmd(args: CategoryArgs, output: &Output) -> Result<()> {
    let command = args.command.unwrap_or(CategoryCommand::List);
    let user = Session::current()?;
    if !matches!(command, CategoryCommand::List) {
        auth::require_admin(&user)?;
    }

    let store = open_store()?;
    let categories = Categories::new(&store);
    match command {
        CategoryCommand::List => handle_list(&categories, output).await,
        CategoryCommand::Create {
            name,
            description,
            color,
        } => {
            let name = match name {
                Some(name) => name,
                None => Input::with_theme(&ColorfulTheme::default())
                    .with_prompt(Message::PromptCategoryName.to_string())
                    .interact_text()?,
            };
            let color = match color {
                Some(color) => color,
                None => select_color(DEFAULT_COLOR)?,
            };
            let category = NewCategory::new(&name, description, Some(color), user.user_id.clone());
            output.emit(categories.create(&category).await, |category| {
                msg_success!(Message::CategoryCreated(category.name.clone()));
                Ok(())
            })
        }
        CategoryCommand::Edit { id } => handle_edit(&categories, id, output).await,
        CategoryCommand::Delete { id, yes } => handle_delete(&categories, id, yes, output).await,
    }
}

fn select_color(current: &str) -> Result<String> {
    let labels: Vec<String> = PALETTE.iter().map(|(hex, name)| format!("{} ({})", name, hex)).collect();
    let default = PALETTE.iter().position(|(hex, _)| *hex == current).unwrap_or(0);
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptCategoryColor.to_string())
        .items(&labels)
        .default(default)
        .interact()?;
    Ok(PALETTE[selection].0.to_string())
}

async fn handle_list<S: RowStore>(categories: &Categories<'_, S>, output: &Output) -> Result<()> {
    output.emit(categories.list().await, |categories| {
        if categories.is_empty() {
            msg_info!(Message::CategoriesNotFound);
            return Ok(());
        }
        View::categories(categories)
    })
}

async fn handle_edit<S: RowStore>(categories: &Categories<'_, S>, id: RowId, output: &Output) -> Result<()> {
    let category = categories.get(&id).await?;
    msg_print!(Message::EditingCategory(category.name.clone()), true);

    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptCategoryName.to_string())
        .default(category.name.clone())
        .interact_text()?;
    let description: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptCategoryDescription.to_string())
        .default(category.description.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    let current_color = category.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string());
    let color = select_color(&current_color)?;

    let description = Some(description).filter(|d| !d.trim().is_empty());
    let update = CategoryUpdate {
        name: (name != category.name).then_some(name),
        description: (description != category.description).then_some(description),
        color: (color != current_color).then_some(color),
    };
    if update.name.is_none() && update.description.is_none() && update.color.is_none() {
        msg_info!(Message::NoChangesDetected);
        return Ok(());
    }

    output.emit(categories.update(&id, &update).await, |category| {
        msg_success!(Message::CategoryUpdated(category.name.clone()));
        Ok(())
    })
}

async fn handle_delete<S: RowStore>(
    categories: &Categories<'_, S>,
    id: RowId,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let category = categories.get(&id).await?;
    if !yes
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteCategory(category.name.clone()).to_string())
            .default(false)
            .interact()?
    {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    output.emit(categories.delete(&id).await, |category| {
        msg_success!(Message::CategoryDeleted(category.name.clone()));
        Ok(())
    })
}
