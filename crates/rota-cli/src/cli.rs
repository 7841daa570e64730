use clap::{Parser, Subcommand};

/// A terminal tracker for recurring chores and one-off tasks
#[derive(Parser, Debug)]
#[command(name = "rota", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task definition
    Add(AddCommand),
    /// List upcoming task instances
    List(ListCommand),
    /// Mark a task instance as completed
    Done(DoneCommand),
    /// Reopen a completed task instance
    Reopen(ReopenCommand),
    /// Edit a task definition
    Edit(EditCommand),
    /// Delete a task definition and all of its instances
    Delete(DeleteCommand),
    /// Regenerate upcoming instances for every recurring definition
    Generate,
    /// Manage categories
    Category(CategoryCommand),
    /// Inspect and override engine settings
    Config(ConfigCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the task
    pub title: String,
    /// A longer description
    #[clap(short, long)]
    pub description: Option<String>,
    /// Free-form notes
    #[clap(long)]
    pub notes: Option<String>,
    /// Category name (created on first use)
    #[clap(short, long)]
    pub category: Option<String>,
    /// Priority (low, medium, high, urgent)
    #[clap(short, long)]
    pub priority: Option<String>,
    /// Due date for a one-off task (e.g. 'tomorrow', '2024-06-01')
    #[clap(long, conflicts_with_all = ["weekly_on", "monthly_on"])]
    pub due: Option<String>,
    /// Repeat weekly on this weekday (1 = Monday .. 7 = Sunday)
    #[clap(long, conflicts_with = "monthly_on")]
    pub weekly_on: Option<u32>,
    /// Repeat monthly on this day of the month (1-31, taken literally)
    #[clap(long)]
    pub monthly_on: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Include completed instances
    #[clap(short, long)]
    pub all: bool,
    /// List task definitions instead of instances
    #[clap(long)]
    pub definitions: bool,
    /// Only instances of this definition (ID or prefix)
    #[clap(long)]
    pub definition: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DoneCommand {
    /// The ID (or prefix) of the instance to complete
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ReopenCommand {
    /// The ID (or prefix) of the instance to reopen
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID (or prefix) of the definition to edit
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "description")]
    pub description_clear: bool,

    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, conflicts_with = "notes")]
    pub notes_clear: bool,

    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, conflicts_with = "category")]
    pub category_clear: bool,

    /// Priority (low, medium, high, urgent)
    #[arg(long)]
    pub priority: Option<String>,

    /// Due date for a one-off task
    #[arg(long, conflicts_with_all = ["weekly_on", "monthly_on"])]
    pub due: Option<String>,
    #[arg(long, conflicts_with = "due")]
    pub due_clear: bool,

    /// Repeat weekly on this weekday (1 = Monday .. 7 = Sunday)
    #[arg(long, conflicts_with_all = ["monthly_on", "no_recurrence"])]
    pub weekly_on: Option<u32>,
    /// Repeat monthly on this day of the month (1-31)
    #[arg(long, conflicts_with = "no_recurrence")]
    pub monthly_on: Option<u32>,
    /// Remove the recurrence rule, purging its future pending instances
    #[arg(long)]
    pub no_recurrence: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID (or prefix) of the definition to delete
    pub id: String,
    /// Skip the confirmation prompt
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CategoryCommand {
    #[command(subcommand)]
    pub command: CategoryCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategoryCommands {
    /// Add a category
    Add { name: String },
    /// List categories
    List,
    /// Delete a category (definitions keep their tasks, losing the label)
    Delete { name: String },
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show one setting
    Get { key: String },
    /// Override a setting (MAX_INSTANCES_TO_GENERATE, MAX_ADVANCE_GENERATION_MONTHS)
    Set { key: String, value: String },
    /// List all stored overrides
    List,
}
