use crate::error::CoreError;
use crate::models::{InstanceStatus, TaskInstance};
use crate::repository::{InstanceFilter, InstanceQueryResult, SqliteRepository};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

#[async_trait]
impl super::InstanceRepository for SqliteRepository {
    async fn find_instance_by_id(&self, id: Uuid) -> Result<Option<TaskInstance>, CoreError> {
        let instance = sqlx::query_as("SELECT * FROM task_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(instance)
    }

    async fn find_instances_by_short_id_prefix(
        &self,
        short_id: &str,
    ) -> Result<Vec<TaskInstance>, CoreError> {
        // Ids are stored as 16-byte blobs; compare against the hex form.
        let mut pattern = short_id.replace('-', "").to_lowercase();
        pattern.push('%');

        let instances: Vec<TaskInstance> =
            sqlx::query_as("SELECT * FROM task_instances WHERE lower(hex(id)) LIKE $1")
                .bind(pattern)
                .fetch_all(self.pool())
                .await?;
        Ok(instances)
    }

    async fn find_instances_with_details(
        &self,
        filter: &InstanceFilter,
    ) -> Result<Vec<InstanceQueryResult>, CoreError> {
        let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"SELECT
                i.id, i.task_definition_id, i.due_date, i.status, i.completion_date,
                d.title, d.priority,
                c.name AS category_name
            FROM task_instances i
            JOIN task_definitions d ON i.task_definition_id = d.id
            LEFT JOIN categories c ON d.category_id = c.id
            WHERE 1 = 1"#,
        );

        if !filter.include_completed {
            query_builder.push(" AND i.status = ");
            query_builder.push_bind(InstanceStatus::Pending);
        }
        if let Some(definition_id) = filter.definition_id {
            query_builder.push(" AND i.task_definition_id = ");
            query_builder.push_bind(definition_id);
        }
        query_builder.push(" ORDER BY i.due_date");

        let instances = query_builder
            .build_query_as()
            .fetch_all(self.pool())
            .await?;
        Ok(instances)
    }

    async fn complete_instance(&self, id: Uuid) -> Result<TaskInstance, CoreError> {
        let mut tx = self.pool().begin().await?;

        let existing: TaskInstance = sqlx::query_as("SELECT * FROM task_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        // The completion date is set once, on the pending-to-completed
        // transition only.
        if existing.status == InstanceStatus::Completed {
            return Err(CoreError::InvalidInput(
                "instance is already completed".to_string(),
            ));
        }

        let instance: TaskInstance = sqlx::query_as(
            r#"UPDATE task_instances
            SET status = $1, completion_date = $2
            WHERE id = $3
            RETURNING *"#,
        )
        .bind(InstanceStatus::Completed)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(instance)
    }

    async fn reopen_instance(&self, id: Uuid) -> Result<TaskInstance, CoreError> {
        let instance: TaskInstance = sqlx::query_as(
            r#"UPDATE task_instances
            SET status = $1, completion_date = NULL
            WHERE id = $2
            RETURNING *"#,
        )
        .bind(InstanceStatus::Pending)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        Ok(instance)
    }
}
