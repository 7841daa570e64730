use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    #[serde(with = "uuid::serde::compact")]
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Stored lifecycle state of an instance. Overdue is a display state derived
/// from a pending instance's due date, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum InstanceStatus {
    Pending,
    Completed,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid instance status: {0}")]
pub struct ParseInstanceStatusError(String);

impl FromStr for InstanceStatus {
    type Err = ParseInstanceStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(InstanceStatus::Pending),
            "completed" => Ok(InstanceStatus::Completed),
            _ => Err(ParseInstanceStatusError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid priority: {0}")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// The two supported recurrence forms. A closed enum: an unrecognized type
/// string is rejected when parsed, so it can never reach the generator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum RuleType {
    Weekly,
    Monthly,
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleType::Weekly => write!(f, "weekly"),
            RuleType::Monthly => write!(f, "monthly"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence rule type: {0}")]
pub struct ParseRuleTypeError(String);

impl FromStr for RuleType {
    type Err = ParseRuleTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(RuleType::Weekly),
            "monthly" => Ok(RuleType::Monthly),
            _ => Err(ParseRuleTypeError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidRuleError {
    #[error("weekly recurring day must be between 1 (Monday) and 7 (Sunday), got {0}")]
    WeeklyDayOutOfRange(u32),
    #[error("monthly recurring day must be between 1 and 31, got {0}")]
    MonthlyDayOutOfRange(u32),
    #[error("weekly rule is missing its recurring day")]
    MissingWeeklyDay,
    #[error("monthly rule is missing its recurring day")]
    MissingMonthlyDay,
}

/// A recurrence rule owned by exactly one task definition.
///
/// `weekly_recurring_day` is 1 (Monday) through 7 (Sunday) and meaningful
/// only for weekly rules; `monthly_recurring_day` is 1 through 31, taken
/// literally, and meaningful only for monthly rules.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecurrenceRule {
    #[serde(with = "uuid::serde::compact")]
    pub task_definition_id: Uuid,
    pub rule_type: RuleType,
    pub weekly_recurring_day: Option<u32>,
    pub monthly_recurring_day: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurrenceRule {
    /// The day field that is meaningful for this rule's type.
    pub fn day(&self) -> Option<u32> {
        match self.rule_type {
            RuleType::Weekly => self.weekly_recurring_day,
            RuleType::Monthly => self.monthly_recurring_day,
        }
    }
}

/// Validated input form of a recurrence rule, before it is attached to a
/// definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpec {
    pub rule_type: RuleType,
    pub day: u32,
}

impl RuleSpec {
    pub fn weekly(day: u32) -> Self {
        Self { rule_type: RuleType::Weekly, day }
    }

    pub fn monthly(day: u32) -> Self {
        Self { rule_type: RuleType::Monthly, day }
    }

    pub fn validate(&self) -> Result<(), InvalidRuleError> {
        match self.rule_type {
            RuleType::Weekly if !(1..=7).contains(&self.day) => {
                Err(InvalidRuleError::WeeklyDayOutOfRange(self.day))
            }
            RuleType::Monthly if !(1..=31).contains(&self.day) => {
                Err(InvalidRuleError::MonthlyDayOutOfRange(self.day))
            }
            _ => Ok(()),
        }
    }
}

/// The definition of a task: what is to be done, and either when (one-off
/// `due_date`) or how often (an owned [`RecurrenceRule`]). The two are
/// mutually exclusive; the repository enforces the invariant on writes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskDefinition {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub category_id: Option<Uuid>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for TaskDefinition {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            title: "".to_string(),
            description: None,
            notes: None,
            category_id: None,
            priority: Priority::Medium,
            due_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

/// A single datable occurrence of a task, trackable to completion.
/// At most one instance exists per (task_definition_id, due_date).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskInstance {
    pub id: Uuid,
    pub task_definition_id: Uuid,
    pub due_date: DateTime<Utc>,
    pub status: InstanceStatus,
    pub completion_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TaskInstance {
    /// Whether this instance should display as overdue at `now`.
    #[inline]
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status == InstanceStatus::Pending && self.due_date < now
    }
}

/// A key/value override row. Only the generation-cap keys in
/// [`crate::settings`] are meaningful to the engine; anything else is
/// carried opaquely.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewDefinitionData {
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub category_name: Option<String>,
    pub priority: Option<Priority>,
    /// One-off due date; mutually exclusive with `rule`.
    pub due_date: Option<DateTime<Utc>>,
    /// Recurrence to attach; the first batch of instances is generated in
    /// the same transaction as the definition.
    pub rule: Option<RuleSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDefinitionData {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub category_name: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// `Some(Some(spec))` replaces the rule and regenerates future pending
    /// instances; `Some(None)` removes the rule and purges them.
    pub rule: Option<Option<RuleSpec>>,
}
