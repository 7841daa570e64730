use crate::error::CoreError;
use crate::models::Category;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl super::CategoryRepository for SqliteRepository {
    async fn add_category(&self, name: String) -> Result<Category, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "category name is required".to_string(),
            ));
        }

        let result = sqlx::query_as(
            r#"INSERT INTO categories (id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING *"#,
        )
        .bind(Uuid::now_v7())
        .bind(name.trim())
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await;

        match result {
            Ok(category) => Ok(category),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                CoreError::InvalidInput(format!("category '{}' already exists", name.trim())),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, CoreError> {
        let category = sqlx::query_as("SELECT * FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool())
            .await?;
        Ok(category)
    }

    async fn find_categories(&self) -> Result<Vec<Category>, CoreError> {
        let categories = sqlx::query_as("SELECT * FROM categories ORDER BY name")
            .fetch_all(self.pool())
            .await?;
        Ok(categories)
    }

    async fn delete_category(&self, name: String) -> Result<(), CoreError> {
        // Definitions referencing the category are detached (SET NULL),
        // not deleted.
        let result = sqlx::query("DELETE FROM categories WHERE name = $1")
            .bind(&name)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Category '{}' not found", name)));
        }
        Ok(())
    }
}
