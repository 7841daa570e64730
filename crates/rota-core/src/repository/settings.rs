use crate::error::CoreError;
use crate::models::Setting;
use crate::repository::SqliteRepository;
use async_trait::async_trait;

#[async_trait]
impl super::SettingsRepository for SqliteRepository {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, CoreError> {
        let setting = sqlx::query_as("SELECT * FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(self.pool())
            .await?;
        Ok(setting)
    }

    async fn set_setting(&self, key: String, value: String) -> Result<Setting, CoreError> {
        if key.trim().is_empty() {
            return Err(CoreError::InvalidInput("setting key is required".to_string()));
        }

        let setting = sqlx::query_as(
            r#"INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            RETURNING *"#,
        )
        .bind(key.trim())
        .bind(value)
        .fetch_one(self.pool())
        .await?;
        Ok(setting)
    }

    async fn find_settings(&self) -> Result<Vec<Setting>, CoreError> {
        let settings = sqlx::query_as("SELECT * FROM settings ORDER BY key")
            .fetch_all(self.pool())
            .await?;
        Ok(settings)
    }
}
