use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use rota_core::repository::Repository;

pub async fn generate_all(repo: &impl Repository) -> Result<()> {
    let summary = repo.refresh_all_definitions().await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Processed {} recurring definition(s): {} instance(s) created, {} purged.",
        "✓".style(success_style),
        summary.definitions_processed,
        summary.instances_created,
        summary.instances_purged
    );
    Ok(())
}
