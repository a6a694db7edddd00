//! 配置存储服务
//! 使用 SQLite 数据库持久化订阅列表、访问令牌和端口

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use crate::core::error::{StoreError, SubscriptionError};
use crate::core::models::{keys, SubscriptionRecord, DEFAULT_PORT, DEFAULT_TOKEN};
use crate::core::traits::{ConfigStore, StorageConfig, SubscriptionEdit};

/// SQLite 配置存储
pub struct SqliteConfigStore {
    pool: SqlitePool,
    // 订阅列表的读-改-写锁
    write_lock: Mutex<()>,
}

impl SqliteConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    async fn get_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM configs WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO configs (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_subscriptions(&self) -> Result<Vec<SubscriptionRecord>, StoreError> {
        let rows = sqlx::query("SELECT name, url, added_at FROM subscriptions ORDER BY position")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| SubscriptionRecord {
                name: row.get("name"),
                url: row.get("url"),
                added_at: row.get("added_at"),
            })
            .collect())
    }

    /// 事务内整体替换
    async fn write_subscriptions(&self, records: &[SubscriptionRecord]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM subscriptions")
            .execute(&mut *tx)
            .await?;

        for (position, record) in records.iter().enumerate() {
            sqlx::query(
                "INSERT INTO subscriptions (position, name, url, added_at) VALUES (?, ?, ?, ?)",
            )
            .bind(position as i64)
            .bind(&record.name)
            .bind(&record.url)
            .bind(&record.added_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// 导入旧版平面文件 (subscriptions.json / access_token.txt / port.txt)
    /// 只执行一次，返回导入的订阅数量
    pub async fn migrate_legacy_files<S: StorageConfig>(
        &self,
        storage: &S,
    ) -> Result<usize, StoreError> {
        if self.get_value(keys::LEGACY_MIGRATED).await?.is_some() {
            return Ok(0);
        }

        let mut imported = 0;

        let subs_path = storage.legacy_subscriptions_path();
        if subs_path.exists() {
            let content = std::fs::read_to_string(&subs_path)?;
            match serde_json::from_str::<Vec<SubscriptionRecord>>(&content) {
                Ok(records) => {
                    let _lock = self.write_lock.lock().await;
                    if self.fetch_subscriptions().await?.is_empty() {
                        self.write_subscriptions(&records).await?;
                        imported = records.len();
                    }
                }
                Err(e) => tracing::warn!("旧版订阅文件解析失败，已跳过: {}", e),
            }
        }

        let token_path = storage.legacy_token_path();
        if token_path.exists() && self.get_value(keys::ACCESS_TOKEN).await?.is_none() {
            let token = std::fs::read_to_string(&token_path)?;
            let token = token.trim();
            if !token.is_empty() {
                self.set_value(keys::ACCESS_TOKEN, token).await?;
            }
        }

        let port_path = storage.legacy_port_path();
        if port_path.exists() && self.get_value(keys::PORT).await?.is_none() {
            let port = std::fs::read_to_string(&port_path)?;
            match port.trim().parse::<u16>() {
                Ok(port) => self.set_value(keys::PORT, &port.to_string()).await?,
                Err(e) => tracing::warn!("旧版端口文件无效，已跳过: {}", e),
            }
        }

        self.set_value(keys::LEGACY_MIGRATED, "1").await?;
        if imported > 0 {
            tracing::info!("Migrated {} subscriptions from legacy files.", imported);
        }
        Ok(imported)
    }
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn list_subscriptions(&self) -> Vec<SubscriptionRecord> {
        match self.fetch_subscriptions().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("读取订阅列表失败: {}", e);
                Vec::new()
            }
        }
    }

    async fn save_subscriptions(&self, records: &[SubscriptionRecord]) -> Result<(), StoreError> {
        let _lock = self.write_lock.lock().await;
        self.write_subscriptions(records).await
    }

    async fn update_subscriptions<'a>(
        &self,
        edit: SubscriptionEdit<'a>,
    ) -> Result<(), SubscriptionError> {
        let _lock = self.write_lock.lock().await;
        let mut records = self.fetch_subscriptions().await?;
        edit(&mut records)?;
        self.write_subscriptions(&records).await?;
        Ok(())
    }

    async fn load_token(&self) -> String {
        match self.get_value(keys::ACCESS_TOKEN).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                if let Err(e) = self.set_value(keys::ACCESS_TOKEN, DEFAULT_TOKEN).await {
                    tracing::error!("写入默认访问令牌失败: {}", e);
                }
                DEFAULT_TOKEN.to_string()
            }
            Err(e) => {
                tracing::error!("读取访问令牌失败: {}", e);
                DEFAULT_TOKEN.to_string()
            }
        }
    }

    async fn save_token(&self, token: &str) -> Result<(), StoreError> {
        self.set_value(keys::ACCESS_TOKEN, token).await
    }

    async fn load_port(&self) -> u16 {
        match self.get_value(keys::PORT).await {
            Ok(Some(value)) => value.trim().parse().unwrap_or_else(|e| {
                tracing::error!("读取端口失败: {} ({})", e, value);
                DEFAULT_PORT
            }),
            Ok(None) => {
                if let Err(e) = self.set_value(keys::PORT, &DEFAULT_PORT.to_string()).await {
                    tracing::error!("写入默认端口失败: {}", e);
                }
                DEFAULT_PORT
            }
            Err(e) => {
                tracing::error!("读取端口失败: {}", e);
                DEFAULT_PORT
            }
        }
    }

    async fn save_port(&self, port: u16) -> Result<(), StoreError> {
        self.set_value(keys::PORT, &port.to_string()).await
    }
}
