use anyhow::Result;
use rota_core::repository::Repository;

use crate::cli::{CategoryCommand, CategoryCommands};
use crate::views::table;

pub async fn category_command(repo: &impl Repository, command: CategoryCommand) -> Result<()> {
    match command.command {
        CategoryCommands::Add { name } => {
            let category = repo.add_category(name).await?;
            println!("Added category '{}'.", category.name);
        }
        CategoryCommands::List => {
            let categories = repo.find_categories().await?;
            table::display_categories(&categories);
        }
        CategoryCommands::Delete { name } => {
            repo.delete_category(name.clone()).await?;
            println!("Deleted category '{}'.", name);
        }
    }
    Ok(())
}
