use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use rota_core::models::{NewDefinitionData, Priority, RuleSpec};
use rota_core::repository::Repository;

use crate::cli::AddCommand;
use crate::parser::parse_due_date;

pub async fn add_definition(repo: &impl Repository, command: AddCommand) -> Result<()> {
    let due_date = command.due.as_ref().map(|d| parse_due_date(d)).transpose()?;
    let priority = command
        .priority
        .as_deref()
        .map(str::parse::<Priority>)
        .transpose()?;

    let rule = match (command.weekly_on, command.monthly_on) {
        (Some(day), _) => Some(RuleSpec::weekly(day)),
        (None, Some(day)) => Some(RuleSpec::monthly(day)),
        (None, None) => None,
    };

    let data = NewDefinitionData {
        title: command.title,
        description: command.description,
        notes: command.notes,
        category_name: command.category,
        priority,
        due_date,
        rule,
    };

    let is_recurring = data.rule.is_some();
    let definition = repo.add_definition(data).await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    if is_recurring {
        println!(
            "{} Created recurring task: {}",
            "✓".style(success_style),
            definition.title.bold()
        );
        println!(
            "  {} Definition ID: {}",
            "→".style(info_style),
            definition.id.to_string().yellow()
        );
        println!(
            "  {} Upcoming instances generated; see them with: rota list",
            "→".style(info_style)
        );
    } else {
        println!(
            "{} Created task: {}",
            "✓".style(success_style),
            definition.title.bold()
        );
        println!(
            "  {} Definition ID: {}",
            "→".style(info_style),
            definition.id.to_string().yellow()
        );
        if let Some(due) = definition.due_date {
            println!(
                "  {} Due: {}",
                "→".style(info_style),
                due.format("%Y-%m-%d").to_string().cyan()
            );
        }
    }

    Ok(())
}
