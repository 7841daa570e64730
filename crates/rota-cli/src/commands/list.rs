use anyhow::Result;
use rota_core::repository::{InstanceFilter, Repository};

use crate::cli::ListCommand;
use crate::util::resolve_definition_id;
use crate::views::table;

pub async fn list(repo: &impl Repository, command: ListCommand) -> Result<()> {
    if command.definitions {
        let definitions = repo.find_definitions_with_details().await?;
        table::display_definitions(&definitions);
        return Ok(());
    }

    let definition_id = match &command.definition {
        Some(id) => Some(resolve_definition_id(repo, id).await?),
        None => None,
    };

    let filter = InstanceFilter {
        definition_id,
        include_completed: command.all,
    };
    let instances = repo.find_instances_with_details(&filter).await?;
    table::display_instances(&instances);

    Ok(())
}
