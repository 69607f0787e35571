//! MySQL-backed module store.
//!
//! # Schema
//! ```sql
//! CREATE TABLE modules (
//!     id          BIGINT AUTO_INCREMENT PRIMARY KEY,
//!     name        VARCHAR(255) NOT NULL,
//!     content     LONGTEXT NOT NULL,
//!     description TEXT NOT NULL,
//!     category    VARCHAR(255) NOT NULL,
//!     create_time DATETIME NOT NULL,
//!     update_time DATETIME NOT NULL
//! );
//! ```
//!
//! Text columns are read as nullable so tables created by older tooling
//! (nullable `longtext` everywhere) still load; NULL reads back as "".

use super::{ModuleRepository, RepositoryError};
use crate::config::DatabaseConfig;
use crate::module::Module;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::info;

const MAX_CONNECTIONS: u32 = 10;

const SELECT_COLUMNS: &str =
    "SELECT id, name, content, description, category, create_time, update_time FROM modules";

#[derive(sqlx::FromRow)]
struct ModuleRow {
    id: i64,
    name: Option<String>,
    content: Option<String>,
    description: Option<String>,
    category: Option<String>,
    create_time: DateTime<Utc>,
    update_time: DateTime<Utc>,
}

impl From<ModuleRow> for Module {
    fn from(row: ModuleRow) -> Self {
        Self {
            id: row.id,
            name: row.name.unwrap_or_default(),
            content: row.content.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            category: row.category.unwrap_or_default(),
            create_time: row.create_time,
            update_time: row.update_time,
        }
    }
}

/// Module repository over a shared sqlx connection pool.
#[derive(Clone)]
pub struct MySqlModuleRepository {
    pool: MySqlPool,
}

impl MySqlModuleRepository {
    /// Connect using the configured database settings.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(&config.url())
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to MySQL at {}:{}/{}",
                    config.host, config.port, config.name
                )
            })?;

        info!(host = %config.host, port = config.port, database = %config.name, "Connected to MySQL");
        Ok(Self { pool })
    }

    /// Create the `modules` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS modules (
                id          BIGINT AUTO_INCREMENT PRIMARY KEY,
                name        VARCHAR(255) NOT NULL,
                content     LONGTEXT NOT NULL,
                description TEXT NOT NULL,
                category    VARCHAR(255) NOT NULL,
                create_time DATETIME NOT NULL,
                update_time DATETIME NOT NULL
            ) DEFAULT CHARSET = utf8mb4
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create modules table")?;
        Ok(())
    }

    async fn exists(&self, id: i64) -> Result<bool, RepositoryError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM modules WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl ModuleRepository for MySqlModuleRepository {
    async fn get_by_id(&self, id: i64) -> Result<Module, RepositoryError> {
        let row: ModuleRow = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn list_all(&self) -> Result<Vec<Module>, RepositoryError> {
        let rows: Vec<ModuleRow> = sqlx::query_as(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Module::from).collect())
    }

    async fn insert(&self, mut module: Module) -> Result<Module, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO modules (name, content, description, category, create_time, update_time)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&module.name)
        .bind(&module.content)
        .bind(&module.description)
        .bind(&module.category)
        .bind(module.create_time)
        .bind(module.update_time)
        .execute(&self.pool)
        .await?;

        module.id = i64::try_from(result.last_insert_id())
            .map_err(|e| RepositoryError::Storage(e.into()))?;
        Ok(module)
    }

    async fn replace(&self, module: &Module) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE modules
            SET name = ?, content = ?, description = ?, category = ?,
                create_time = ?, update_time = ?
            WHERE id = ?
            "#,
        )
        .bind(&module.name)
        .bind(&module.content)
        .bind(&module.description)
        .bind(&module.category)
        .bind(module.create_time)
        .bind(module.update_time)
        .bind(module.id)
        .execute(&self.pool)
        .await?;

        // MySQL counts changed rows, not matched rows: an identical
        // overwrite reports 0 even though the record exists.
        if result.rows_affected() == 0 && !self.exists(module.id).await? {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM modules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
