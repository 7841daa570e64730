use anyhow::Result;
use chrono_humanize::Humanize;
use owo_colors::{OwoColorize, Style};
use rota_core::repository::Repository;

use crate::cli::{DoneCommand, ReopenCommand};
use crate::util::resolve_instance_id;

pub async fn complete_instance(repo: &impl Repository, command: DoneCommand) -> Result<()> {
    let instance_id = resolve_instance_id(repo, &command.id).await?;
    let instance = repo.complete_instance(instance_id).await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Completed instance {} (was due {})",
        "✓".style(success_style),
        (&instance.id.to_string()[..7]).yellow(),
        instance.due_date.humanize()
    );
    Ok(())
}

pub async fn reopen_instance(repo: &impl Repository, command: ReopenCommand) -> Result<()> {
    let instance_id = resolve_instance_id(repo, &command.id).await?;
    let instance = repo.reopen_instance(instance_id).await?;

    println!(
        "Reopened instance {} (due {})",
        (&instance.id.to_string()[..7]).yellow(),
        instance.due_date.humanize()
    );
    Ok(())
}
