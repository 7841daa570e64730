use rota_core::error::CoreError;
use rota_core::repository::{DefinitionRepository, InstanceRepository};
use uuid::Uuid;

/// Resolves a full or prefix task definition ID to a unique UUID.
pub async fn resolve_definition_id(
    repo: &impl DefinitionRepository,
    id: &str,
) -> Result<Uuid, CoreError> {
    if let Ok(uuid) = id.parse::<Uuid>() {
        return Ok(uuid);
    }

    let matches = repo.find_definitions_by_short_id_prefix(id).await?;
    match matches.len() {
        0 => Err(CoreError::NotFound(format!(
            "No task definition matches '{}'",
            id
        ))),
        1 => Ok(matches[0].id),
        _ => Err(CoreError::AmbiguousId(
            matches
                .into_iter()
                .map(|d| (d.id.to_string(), d.title))
                .collect(),
        )),
    }
}

/// Resolves a full or prefix task instance ID to a unique UUID.
pub async fn resolve_instance_id(
    repo: &impl InstanceRepository,
    id: &str,
) -> Result<Uuid, CoreError> {
    if let Ok(uuid) = id.parse::<Uuid>() {
        return Ok(uuid);
    }

    let matches = repo.find_instances_by_short_id_prefix(id).await?;
    match matches.len() {
        0 => Err(CoreError::NotFound(format!(
            "No task instance matches '{}'",
            id
        ))),
        1 => Ok(matches[0].id),
        _ => Err(CoreError::AmbiguousId(
            matches
                .into_iter()
                .map(|i| (i.id.to_string(), i.due_date.format("due %Y-%m-%d").to_string()))
                .collect(),
        )),
    }
}
