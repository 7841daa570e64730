use clap::Parser;
use dialoguer::Confirm;
use owo_colors::{OwoColorize, Style};
use rota_core::db;
use rota_core::error::CoreError;
use rota_core::repository::{DefinitionRepository, SqliteRepository};
use tracing_subscriber::EnvFilter;
use util::resolve_definition_id;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rota_core=warn")),
        )
        .init();

    let config = config::Config::new().unwrap_or_default();
    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let repository = SqliteRepository::new(db_pool);

    let cli = cli::Cli::parse();

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_definition(&repository, command).await,
        cli::Commands::List(command) => commands::list::list(&repository, command).await,
        cli::Commands::Done(command) => {
            commands::done::complete_instance(&repository, command).await
        }
        cli::Commands::Reopen(command) => {
            commands::done::reopen_instance(&repository, command).await
        }
        cli::Commands::Edit(command) => commands::edit::edit_definition(&repository, command).await,
        cli::Commands::Delete(command) => {
            let definition_id = match resolve_definition_id(&repository, &command.id).await {
                Ok(id) => id,
                Err(e) => {
                    handle_error(e.into());
                    std::process::exit(1);
                }
            };
            let definition = match repository.find_definition_by_id(definition_id).await {
                Ok(Some(d)) => d,
                Ok(None) => {
                    let error_style = Style::new().red().bold();
                    eprintln!(
                        "{} Task definition with ID '{}' not found.",
                        "Error:".style(error_style),
                        definition_id
                    );
                    std::process::exit(1);
                }
                Err(e) => {
                    handle_error(e.into());
                    std::process::exit(1);
                }
            };

            if !command.force {
                let confirmation = Confirm::new()
                    .with_prompt(format!(
                        "Delete '{}' and all of its instances?",
                        definition.title
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirmation {
                    println!("Deletion cancelled.");
                    return;
                }
            }
            commands::delete::delete_definition(&repository, definition_id).await
        }
        cli::Commands::Generate => commands::generate::generate_all(&repository).await,
        cli::Commands::Category(command) => {
            commands::category::category_command(&repository, command).await
        }
        cli::Commands::Config(command) => {
            commands::config::config_command(&repository, command).await
        }
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(matches) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, label) in matches {
                    eprintln!("  {} ({})", id.yellow(), label);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidRule(e) => {
                eprintln!("{} Invalid recurrence rule: {}", "Error:".style(error_style), e);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}
