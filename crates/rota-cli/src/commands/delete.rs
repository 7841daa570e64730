use anyhow::Result;
use rota_core::repository::Repository;
use uuid::Uuid;

pub async fn delete_definition(repo: &impl Repository, definition_id: Uuid) -> Result<()> {
    repo.delete_definition(definition_id).await?;
    println!("Deleted task definition and all of its instances.");
    Ok(())
}
