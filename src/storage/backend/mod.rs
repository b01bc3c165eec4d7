//! SeaORM storage backend
//!
//! SQLite access to the standards database (aliquots, analyses,
//! measurements) through SeaORM.

mod connection;
mod converters;
mod mutations;
mod query;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::errors::{NitondbError, Result};

pub use connection::{connect_sqlite, run_migrations};
pub use mutations::{AddReport, UpdateReport};

/// 规范化数据库 URL：支持 sqlite:// 前缀、裸文件路径和 :memory:
pub fn normalize_database_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://") || database_url == ":memory:" {
        Ok(database_url.to_string())
    } else if database_url.starts_with("mysql://")
        || database_url.starts_with("mariadb://")
        || database_url.starts_with("postgres://")
        || database_url.starts_with("postgresql://")
    {
        Err(NitondbError::database_config(format!(
            "Unsupported database URL: {}. The standards database is SQLite only",
            database_url
        )))
    } else {
        // 裸文件路径
        Ok(format!("sqlite://{}", database_url))
    }
}

/// SeaORM-based storage backend for the standards database
#[derive(Clone, Debug)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(NitondbError::database_config(
                "DATABASE_URL 未设置".to_string(),
            ));
        }

        let url = normalize_database_url(database_url)?;
        let db = connect_sqlite(&url).await?;

        let storage = SeaOrmStorage { db };

        // 运行迁移
        run_migrations(&storage.db).await?;

        info!("SQLite storage initialized: {}", database_url);
        Ok(storage)
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
