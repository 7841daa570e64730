use chrono::Utc;
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use rota_core::models::{Category, InstanceStatus, Priority, RuleType, Setting};
use rota_core::repository::{DefinitionQueryResult, InstanceQueryResult};
use rota_core::settings::{
    DEFAULT_MAX_ADVANCE_MONTHS, DEFAULT_MAX_INSTANCES, MAX_ADVANCE_MONTHS_KEY, MAX_INSTANCES_KEY,
};

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn priority_cell(priority: Priority) -> Cell {
    let cell = Cell::new(format!("{:?}", priority));
    match priority {
        Priority::Urgent => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        Priority::High => cell.fg(Color::Red),
        Priority::Medium => cell.fg(Color::Yellow),
        Priority::Low => cell.fg(Color::Green),
    }
}

pub fn display_instances(instances: &[InstanceQueryResult]) {
    if instances.is_empty() {
        println!("No task instances found.");
        return;
    }

    let now = Utc::now();
    let today = now.date_naive();

    let mut table = Table::new();
    table.set_header(vec!["ID", "Task", "Category", "Priority", "Due", "Status"]);

    for instance in instances {
        let mut row = Row::new();
        row.add_cell(Cell::new(&instance.id.to_string()[..7]));

        let mut title_cell = Cell::new(&instance.title);
        if instance.status == InstanceStatus::Completed {
            title_cell = title_cell
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey);
        }
        row.add_cell(title_cell);

        row.add_cell(Cell::new(
            instance.category_name.as_deref().unwrap_or("None"),
        ));
        row.add_cell(priority_cell(instance.priority));

        let due_text = instance.due_date.humanize();
        let due_cell = if instance.is_overdue_at(now) {
            Cell::new(due_text).fg(Color::Red)
        } else if instance.status == InstanceStatus::Pending
            && instance.due_date.date_naive() == today
        {
            Cell::new(due_text).fg(Color::Yellow)
        } else {
            Cell::new(due_text)
        };
        row.add_cell(due_cell);

        // Overdue is derived from the due date, never stored.
        let status_cell = if instance.is_overdue_at(now) {
            Cell::new("Overdue").fg(Color::Red)
        } else {
            match instance.status {
                InstanceStatus::Completed => Cell::new("Completed").fg(Color::Green),
                InstanceStatus::Pending => Cell::new("Pending"),
            }
        };
        row.add_cell(status_cell);

        table.add_row(row);
    }

    println!("{table}");
}

fn schedule_text(definition: &DefinitionQueryResult) -> String {
    match definition.rule_type {
        Some(RuleType::Weekly) => match definition.weekly_recurring_day {
            Some(day @ 1..=7) => format!("every {}", WEEKDAY_NAMES[(day - 1) as usize]),
            _ => "weekly".to_string(),
        },
        Some(RuleType::Monthly) => match definition.monthly_recurring_day {
            Some(day) => format!("monthly on day {}", day),
            None => "monthly".to_string(),
        },
        None => match definition.due_date {
            Some(due) => format!("once, {}", due.format("%Y-%m-%d")),
            None => "-".to_string(),
        },
    }
}

pub fn display_definitions(definitions: &[DefinitionQueryResult]) {
    if definitions.is_empty() {
        println!("No task definitions found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Category", "Priority", "Schedule"]);

    for definition in definitions {
        let mut row = Row::new();
        row.add_cell(Cell::new(&definition.id.to_string()[..7]));

        let mut title_cell = Cell::new(&definition.title);
        if definition.rule_type.is_some() {
            title_cell = Cell::new(format!("↻ {}", definition.title));
        }
        row.add_cell(title_cell);

        row.add_cell(Cell::new(
            definition.category_name.as_deref().unwrap_or("None"),
        ));
        row.add_cell(priority_cell(definition.priority));
        row.add_cell(Cell::new(schedule_text(definition)));

        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Created"]);
    for category in categories {
        let mut row = Row::new();
        row.add_cell(Cell::new(&category.name));
        row.add_cell(Cell::new(category.created_at.humanize()));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_settings(settings: &[Setting]) {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Value"]);

    for setting in settings {
        let mut row = Row::new();
        row.add_cell(Cell::new(&setting.key));
        row.add_cell(Cell::new(&setting.value));
        table.add_row(row);
    }

    // Engine keys fall back to built-in defaults when not overridden.
    for (key, default) in [
        (MAX_INSTANCES_KEY, DEFAULT_MAX_INSTANCES),
        (MAX_ADVANCE_MONTHS_KEY, DEFAULT_MAX_ADVANCE_MONTHS),
    ] {
        if !settings.iter().any(|s| s.key == key) {
            let mut row = Row::new();
            row.add_cell(Cell::new(key).fg(Color::DarkGrey));
            row.add_cell(Cell::new(format!("{} (default)", default)).fg(Color::DarkGrey));
            table.add_row(row);
        }
    }

    println!("{table}");
}
