use anyhow::Result;
use rota_core::models::{Priority, RuleSpec, UpdateDefinitionData};
use rota_core::repository::Repository;

use crate::cli::EditCommand;
use crate::parser::parse_due_date;
use crate::util::resolve_definition_id;

pub async fn edit_definition(repo: &impl Repository, command: EditCommand) -> Result<()> {
    let definition_id = resolve_definition_id(repo, &command.id).await?;

    let description = if command.description_clear {
        Some(None)
    } else {
        command.description.map(Some)
    };

    let notes = if command.notes_clear {
        Some(None)
    } else {
        command.notes.map(Some)
    };

    let category_name = if command.category_clear {
        Some(None)
    } else {
        command.category.map(Some)
    };

    let priority = command
        .priority
        .as_deref()
        .map(str::parse::<Priority>)
        .transpose()?;

    let rule = if command.no_recurrence {
        Some(None)
    } else {
        match (command.weekly_on, command.monthly_on) {
            (Some(day), _) => Some(Some(RuleSpec::weekly(day))),
            (None, Some(day)) => Some(Some(RuleSpec::monthly(day))),
            (None, None) => None,
        }
    };

    let due_date = if command.due_clear {
        Some(None)
    } else if let Some(due_str) = command.due {
        Some(Some(parse_due_date(&due_str)?))
    } else if matches!(rule, Some(Some(_))) {
        // Attaching a rule supersedes a one-off due date.
        Some(None)
    } else {
        None
    };

    let update_data = UpdateDefinitionData {
        title: command.title,
        description,
        notes,
        category_name,
        priority,
        due_date,
        rule,
    };

    let updated = repo.update_definition(definition_id, update_data).await?;

    match &rule {
        Some(Some(_)) => println!(
            "Updated definition '{}' and regenerated its upcoming instances.",
            updated.title
        ),
        Some(None) => println!(
            "Updated definition '{}'; recurrence removed and pending future instances purged.",
            updated.title
        ),
        None => println!("Updated definition '{}'.", updated.title),
    }

    Ok(())
}
