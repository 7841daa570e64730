use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    Category, InstanceStatus, NewDefinitionData, Priority, RecurrenceRule, RuleType, Setting,
    TaskDefinition, TaskInstance, UpdateDefinitionData,
};
use crate::recurrence::GenerationSummary;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export domain modules
pub mod categories;
pub mod definitions;
pub mod generation;
pub mod instances;
pub mod settings;

// Traits are defined in this module and implemented in respective domain modules

/// A task definition joined with its category name and recurrence rule
/// fields, as listed to the surface layer.
#[derive(Debug, Clone, FromRow)]
pub struct DefinitionQueryResult {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub category_id: Option<Uuid>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub rule_type: Option<RuleType>,
    pub weekly_recurring_day: Option<u32>,
    pub monthly_recurring_day: Option<u32>,
}

/// A task instance joined with the definition details needed for display.
#[derive(Debug, Clone, FromRow)]
pub struct InstanceQueryResult {
    pub id: Uuid,
    pub task_definition_id: Uuid,
    pub due_date: DateTime<Utc>,
    pub status: InstanceStatus,
    pub completion_date: Option<DateTime<Utc>>,
    pub title: String,
    pub priority: Priority,
    pub category_name: Option<String>,
}

impl InstanceQueryResult {
    /// Whether this instance should display as overdue at `now`.
    #[inline]
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status == InstanceStatus::Pending && self.due_date < now
    }
}

/// Filter for instance listings.
#[derive(Debug, Clone, Default)]
pub struct InstanceFilter {
    /// Restrict to instances of one definition.
    pub definition_id: Option<Uuid>,
    /// Include completed instances alongside pending ones.
    pub include_completed: bool,
}

/// Domain-specific trait for task definition operations
#[async_trait]
pub trait DefinitionRepository {
    async fn add_definition(&self, data: NewDefinitionData) -> Result<TaskDefinition, CoreError>;
    async fn find_definition_by_id(&self, id: Uuid) -> Result<Option<TaskDefinition>, CoreError>;
    async fn find_definitions_by_short_id_prefix(
        &self,
        short_id: &str,
    ) -> Result<Vec<TaskDefinition>, CoreError>;
    async fn find_definitions_with_details(&self) -> Result<Vec<DefinitionQueryResult>, CoreError>;
    async fn find_rule_for_definition(
        &self,
        definition_id: Uuid,
    ) -> Result<Option<RecurrenceRule>, CoreError>;
    async fn update_definition(
        &self,
        id: Uuid,
        data: UpdateDefinitionData,
    ) -> Result<TaskDefinition, CoreError>;
    async fn delete_definition(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for task instance operations
#[async_trait]
pub trait InstanceRepository {
    async fn find_instance_by_id(&self, id: Uuid) -> Result<Option<TaskInstance>, CoreError>;
    async fn find_instances_by_short_id_prefix(
        &self,
        short_id: &str,
    ) -> Result<Vec<TaskInstance>, CoreError>;
    async fn find_instances_with_details(
        &self,
        filter: &InstanceFilter,
    ) -> Result<Vec<InstanceQueryResult>, CoreError>;
    async fn complete_instance(&self, id: Uuid) -> Result<TaskInstance, CoreError>;
    async fn reopen_instance(&self, id: Uuid) -> Result<TaskInstance, CoreError>;
}

/// Domain-specific trait for instance generation operations
#[async_trait]
pub trait GenerationRepository {
    /// Re-runs the generator for one definition, purging stale future
    /// pending instances first. Returns the number of instances created.
    async fn regenerate_instances(&self, definition_id: Uuid) -> Result<usize, CoreError>;
    /// Runs regeneration for every recurring definition. This is the entry
    /// point an external timer invokes; the engine itself owns no schedule.
    async fn refresh_all_definitions(&self) -> Result<GenerationSummary, CoreError>;
}

/// Domain-specific trait for category operations
#[async_trait]
pub trait CategoryRepository {
    async fn add_category(&self, name: String) -> Result<Category, CoreError>;
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, CoreError>;
    async fn find_categories(&self) -> Result<Vec<Category>, CoreError>;
    async fn delete_category(&self, name: String) -> Result<(), CoreError>;
}

/// Domain-specific trait for the settings override store
#[async_trait]
pub trait SettingsRepository {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, CoreError>;
    async fn set_setting(&self, key: String, value: String) -> Result<Setting, CoreError>;
    async fn find_settings(&self) -> Result<Vec<Setting>, CoreError>;
}

/// Main repository trait that composes all domain traits
pub trait Repository:
    DefinitionRepository
    + InstanceRepository
    + GenerationRepository
    + CategoryRepository
    + SettingsRepository
    + Sync
{
    // This trait automatically composes all domain-specific repositories
    // Individual domain operations are defined in their respective traits
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}

// The main Repository trait implementation will automatically be available
// when all domain trait implementations are defined
impl Repository for SqliteRepository {}
