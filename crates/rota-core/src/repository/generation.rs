use crate::error::CoreError;
use crate::models::{InstanceStatus, RecurrenceRule, TaskDefinition};
use crate::recurrence::{
    due_datetime, DueDates, GenerationLimits, GenerationOutcome, GenerationSummary,
};
use crate::repository::SqliteRepository;
use crate::settings::{MAX_ADVANCE_MONTHS_KEY, MAX_INSTANCES_KEY};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::GenerationRepository for SqliteRepository {
    async fn regenerate_instances(&self, definition_id: Uuid) -> Result<usize, CoreError> {
        let mut tx = self.pool().begin().await?;

        let definition: TaskDefinition =
            sqlx::query_as("SELECT * FROM task_definitions WHERE id = $1")
                .bind(definition_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::NotFound(definition_id.to_string()))?;
        let rule: Option<RecurrenceRule> =
            sqlx::query_as("SELECT * FROM recurrence_rules WHERE task_definition_id = $1")
                .bind(definition_id)
                .fetch_optional(&mut *tx)
                .await?;

        // One-off definitions have nothing to regenerate.
        let outcome = match &rule {
            Some(rule) => {
                Self::generate_instances_in_transaction(&mut tx, &definition, rule, false).await?
            }
            None => GenerationOutcome::default(),
        };

        tx.commit().await?;
        Ok(outcome.created)
    }

    async fn refresh_all_definitions(&self) -> Result<GenerationSummary, CoreError> {
        let rules: Vec<RecurrenceRule> = sqlx::query_as("SELECT * FROM recurrence_rules")
            .fetch_all(self.pool())
            .await?;

        let mut summary = GenerationSummary::default();
        for rule in rules {
            let mut tx = self.pool().begin().await?;

            let definition: TaskDefinition =
                sqlx::query_as("SELECT * FROM task_definitions WHERE id = $1")
                    .bind(rule.task_definition_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| {
                        CoreError::NotFound(rule.task_definition_id.to_string())
                    })?;

            let outcome =
                Self::generate_instances_in_transaction(&mut tx, &definition, &rule, false)
                    .await?;
            tx.commit().await?;
            summary.absorb(outcome);
        }

        Ok(summary)
    }
}

impl SqliteRepository {
    /// Materializes future instances for one recurring definition inside the
    /// caller's transaction. Commit and rollback stay with the caller, so
    /// generation composes atomically with the surrounding create or update.
    pub(crate) async fn generate_instances_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        definition: &TaskDefinition,
        rule: &RecurrenceRule,
        is_new_definition: bool,
    ) -> Result<GenerationOutcome, CoreError> {
        // Both caps are read once per call and passed down.
        let limits = Self::resolve_generation_limits(tx).await?;
        let now = Utc::now();

        let mut outcome = GenerationOutcome::default();

        // A rule edit recomputes only what has not happened yet; completed
        // and past instances stay untouched.
        if !is_new_definition {
            outcome.purged =
                Self::purge_future_pending_in_transaction(tx, definition.id, now).await?;
        }

        let today = now.date_naive();
        let mut created: i64 = 0;
        for date in DueDates::for_rule(rule, today, &limits)? {
            if created >= limits.max_instances {
                break;
            }
            let due = due_datetime(date);
            // Candidates that already have an instance consume no budget.
            if Self::instance_exists_in_transaction(tx, definition.id, due).await? {
                continue;
            }
            if Self::insert_instance_in_transaction(tx, definition.id, due).await? {
                created += 1;
            }
        }
        outcome.created = created.max(0) as usize;

        tracing::debug!(
            definition = %definition.id,
            rule_type = %rule.rule_type,
            created = outcome.created,
            purged = outcome.purged,
            "generated task instances"
        );

        Ok(outcome)
    }

    /// Deletes pending instances strictly after `now`. Completed instances
    /// and anything already due are preserved.
    pub(crate) async fn purge_future_pending_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        definition_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, CoreError> {
        let result = sqlx::query(
            "DELETE FROM task_instances WHERE task_definition_id = $1 AND due_date > $2 AND status = $3",
        )
        .bind(definition_id)
        .bind(now)
        .bind(InstanceStatus::Pending)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() as usize)
    }

    async fn instance_exists_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        definition_id: Uuid,
        due_date: DateTime<Utc>,
    ) -> Result<bool, CoreError> {
        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM task_instances WHERE task_definition_id = $1 AND due_date = $2",
        )
        .bind(definition_id)
        .bind(due_date)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(existing.is_some())
    }

    /// Inserts a pending instance, returning false when a concurrent writer
    /// already materialized this (definition, due_date) pair — the unique
    /// constraint decides the race, and the loser's row simply exists.
    pub(crate) async fn insert_instance_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        definition_id: Uuid,
        due_date: DateTime<Utc>,
    ) -> Result<bool, CoreError> {
        let result = sqlx::query(
            r#"INSERT INTO task_instances (id, task_definition_id, due_date, status, created_at)
            VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(Uuid::now_v7())
        .bind(definition_id)
        .bind(due_date)
        .bind(InstanceStatus::Pending)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) async fn resolve_generation_limits(
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<GenerationLimits, CoreError> {
        let max_instances = Self::setting_value_in_transaction(tx, MAX_INSTANCES_KEY).await?;
        let max_months = Self::setting_value_in_transaction(tx, MAX_ADVANCE_MONTHS_KEY).await?;
        Ok(GenerationLimits::from_overrides(
            max_instances.as_deref(),
            max_months.as_deref(),
        ))
    }

    async fn setting_value_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        key: &str,
    ) -> Result<Option<String>, CoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(|(value,)| value))
    }
}
