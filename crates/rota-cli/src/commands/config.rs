use anyhow::Result;
use rota_core::repository::Repository;
use rota_core::settings::{
    DEFAULT_MAX_ADVANCE_MONTHS, DEFAULT_MAX_INSTANCES, MAX_ADVANCE_MONTHS_KEY, MAX_INSTANCES_KEY,
};

use crate::cli::{ConfigCommand, ConfigCommands};
use crate::views::table;

fn builtin_default(key: &str) -> Option<i64> {
    match key {
        MAX_INSTANCES_KEY => Some(DEFAULT_MAX_INSTANCES),
        MAX_ADVANCE_MONTHS_KEY => Some(DEFAULT_MAX_ADVANCE_MONTHS),
        _ => None,
    }
}

pub async fn config_command(repo: &impl Repository, command: ConfigCommand) -> Result<()> {
    match command.command {
        ConfigCommands::Get { key } => match repo.get_setting(&key).await? {
            Some(setting) => println!("{} = {}", setting.key, setting.value),
            None => match builtin_default(&key) {
                Some(default) => println!("{} = {} (default)", key, default),
                None => println!("{} is not set.", key),
            },
        },
        ConfigCommands::Set { key, value } => {
            let setting = repo.set_setting(key, value).await?;
            println!("{} = {}", setting.key, setting.value);
        }
        ConfigCommands::List => {
            let settings = repo.find_settings().await?;
            table::display_settings(&settings);
        }
    }
    Ok(())
}
