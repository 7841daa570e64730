use crate::error::CoreError;
use crate::models::{
    NewDefinitionData, Priority, RecurrenceRule, RuleSpec, RuleType, TaskDefinition,
    UpdateDefinitionData,
};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::DefinitionRepository for SqliteRepository {
    async fn add_definition(&self, data: NewDefinitionData) -> Result<TaskDefinition, CoreError> {
        if data.title.trim().is_empty() {
            return Err(CoreError::InvalidInput("title is required".to_string()));
        }
        // A definition is dated either by a one-off due date or by its rule.
        if data.due_date.is_some() && data.rule.is_some() {
            return Err(CoreError::InvalidInput(
                "a task definition may have a due date or a recurrence rule, not both".to_string(),
            ));
        }
        if let Some(spec) = &data.rule {
            spec.validate()?;
        }

        let mut tx = self.pool().begin().await?;

        let category_id = match &data.category_name {
            Some(name) => {
                Some(Self::find_or_create_category_in_transaction(&mut tx, name).await?)
            }
            None => None,
        };

        let definition: TaskDefinition = sqlx::query_as(
            r#"INSERT INTO task_definitions (id, title, description, notes, category_id, priority, due_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *"#,
        )
        .bind(Uuid::now_v7())
        .bind(data.title.trim())
        .bind(&data.description)
        .bind(&data.notes)
        .bind(category_id)
        .bind(data.priority.unwrap_or(Priority::Medium))
        .bind(data.due_date)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        match (&data.rule, definition.due_date) {
            (Some(spec), _) => {
                let rule =
                    Self::upsert_rule_in_transaction(&mut tx, definition.id, spec).await?;
                Self::generate_instances_in_transaction(&mut tx, &definition, &rule, true)
                    .await?;
            }
            // One-off tasks are materialized once here, outside the engine.
            (None, Some(due)) => {
                Self::insert_instance_in_transaction(&mut tx, definition.id, due).await?;
            }
            (None, None) => {}
        }

        tx.commit().await?;
        Ok(definition)
    }

    async fn find_definition_by_id(&self, id: Uuid) -> Result<Option<TaskDefinition>, CoreError> {
        let definition = sqlx::query_as("SELECT * FROM task_definitions WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(definition)
    }

    async fn find_definitions_by_short_id_prefix(
        &self,
        short_id: &str,
    ) -> Result<Vec<TaskDefinition>, CoreError> {
        // Ids are stored as 16-byte blobs; compare against the hex form.
        let mut pattern = short_id.replace('-', "").to_lowercase();
        pattern.push('%');

        let definitions: Vec<TaskDefinition> =
            sqlx::query_as("SELECT * FROM task_definitions WHERE lower(hex(id)) LIKE $1")
                .bind(pattern)
                .fetch_all(self.pool())
                .await?;
        Ok(definitions)
    }

    async fn find_definitions_with_details(
        &self,
    ) -> Result<Vec<super::DefinitionQueryResult>, CoreError> {
        let definitions = sqlx::query_as(
            r#"SELECT
                d.id, d.title, d.description, d.notes, d.category_id, d.priority,
                d.due_date, d.created_at, d.updated_at,
                c.name AS category_name,
                r.rule_type, r.weekly_recurring_day, r.monthly_recurring_day
            FROM task_definitions d
            LEFT JOIN categories c ON d.category_id = c.id
            LEFT JOIN recurrence_rules r ON r.task_definition_id = d.id
            ORDER BY d.created_at"#,
        )
        .fetch_all(self.pool())
        .await?;
        Ok(definitions)
    }

    async fn find_rule_for_definition(
        &self,
        definition_id: Uuid,
    ) -> Result<Option<RecurrenceRule>, CoreError> {
        let rule = sqlx::query_as("SELECT * FROM recurrence_rules WHERE task_definition_id = $1")
            .bind(definition_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(rule)
    }

    async fn update_definition(
        &self,
        id: Uuid,
        data: UpdateDefinitionData,
    ) -> Result<TaskDefinition, CoreError> {
        if let Some(title) = &data.title {
            if title.trim().is_empty() {
                return Err(CoreError::InvalidInput("title cannot be empty".to_string()));
            }
        }
        if let Some(Some(spec)) = &data.rule {
            spec.validate()?;
        }

        let mut tx = self.pool().begin().await?;

        let existing: TaskDefinition =
            sqlx::query_as("SELECT * FROM task_definitions WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        let existing_rule: Option<RecurrenceRule> =
            sqlx::query_as("SELECT * FROM recurrence_rules WHERE task_definition_id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        // Validate the state the update would leave behind.
        let final_due = match &data.due_date {
            Some(inner) => *inner,
            None => existing.due_date,
        };
        let final_has_rule = match &data.rule {
            Some(inner) => inner.is_some(),
            None => existing_rule.is_some(),
        };
        if final_due.is_some() && final_has_rule {
            return Err(CoreError::InvalidInput(
                "a task definition may have a due date or a recurrence rule, not both".to_string(),
            ));
        }

        let category_id = match &data.category_name {
            Some(Some(name)) => {
                Some(Self::find_or_create_category_in_transaction(&mut tx, name).await?)
            }
            Some(None) => None,
            None => existing.category_id,
        };

        let updated: TaskDefinition = sqlx::query_as(
            r#"UPDATE task_definitions
            SET title = $1, description = $2, notes = $3, category_id = $4,
                priority = $5, due_date = $6, updated_at = $7
            WHERE id = $8
            RETURNING *"#,
        )
        .bind(data.title.as_deref().map(str::trim).unwrap_or(&existing.title))
        .bind(match &data.description {
            Some(inner) => inner.as_deref(),
            None => existing.description.as_deref(),
        })
        .bind(match &data.notes {
            Some(inner) => inner.as_deref(),
            None => existing.notes.as_deref(),
        })
        .bind(category_id)
        .bind(data.priority.unwrap_or(existing.priority))
        .bind(final_due)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        match &data.rule {
            // Replacing the rule recomputes the not-yet-happened instances.
            Some(Some(spec)) => {
                let rule = Self::upsert_rule_in_transaction(&mut tx, id, spec).await?;
                Self::generate_instances_in_transaction(&mut tx, &updated, &rule, false)
                    .await?;
            }
            // Removing the rule purges its future pending instances;
            // history stays.
            Some(None) => {
                if existing_rule.is_some() {
                    sqlx::query("DELETE FROM recurrence_rules WHERE task_definition_id = $1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                    Self::purge_future_pending_in_transaction(&mut tx, id, Utc::now()).await?;
                }
            }
            None => {}
        }

        // A due-date change on a one-off re-materializes its single
        // instance under the same preserve-history rules.
        if data.due_date.is_some() && !final_has_rule {
            Self::purge_future_pending_in_transaction(&mut tx, id, Utc::now()).await?;
            if let Some(due) = final_due {
                Self::insert_instance_in_transaction(&mut tx, id, due).await?;
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_definition(&self, id: Uuid) -> Result<(), CoreError> {
        // The rule and all instances go with the definition (FK cascade).
        let result = sqlx::query("DELETE FROM task_definitions WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

impl SqliteRepository {
    pub(crate) async fn find_or_create_category_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        name: &str,
    ) -> Result<Uuid, CoreError> {
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut **tx)
            .await?;
        if let Some((id,)) = existing {
            return Ok(id);
        }

        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO categories (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;
        Ok(id)
    }

    pub(crate) async fn upsert_rule_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        definition_id: Uuid,
        spec: &RuleSpec,
    ) -> Result<RecurrenceRule, CoreError> {
        let (weekly_day, monthly_day) = match spec.rule_type {
            RuleType::Weekly => (Some(spec.day), None),
            RuleType::Monthly => (None, Some(spec.day)),
        };

        let rule = sqlx::query_as(
            r#"INSERT INTO recurrence_rules
                (task_definition_id, rule_type, weekly_recurring_day, monthly_recurring_day, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (task_definition_id) DO UPDATE SET
                rule_type = excluded.rule_type,
                weekly_recurring_day = excluded.weekly_recurring_day,
                monthly_recurring_day = excluded.monthly_recurring_day,
                updated_at = excluded.updated_at
            RETURNING *"#,
        )
        .bind(definition_id)
        .bind(spec.rule_type)
        .bind(weekly_day)
        .bind(monthly_day)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;
        Ok(rule)
    }
}
