//! 内存配置存储
//! 数据库不可用时的回退实现，也用于测试

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::core::error::{StoreError, SubscriptionError};
use crate::core::models::{SubscriptionRecord, DEFAULT_PORT, DEFAULT_TOKEN};
use crate::core::traits::{ConfigStore, SubscriptionEdit};

pub struct MemoryConfigStore {
    subscriptions: RwLock<Vec<SubscriptionRecord>>,
    token: RwLock<String>,
    port: RwLock<u16>,
    write_lock: Mutex<()>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::with_subscriptions(Vec::new())
    }

    pub fn with_subscriptions(subscriptions: Vec<SubscriptionRecord>) -> Self {
        Self {
            subscriptions: RwLock::new(subscriptions),
            token: RwLock::new(DEFAULT_TOKEN.to_string()),
            port: RwLock::new(DEFAULT_PORT),
            write_lock: Mutex::new(()),
        }
    }
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn list_subscriptions(&self) -> Vec<SubscriptionRecord> {
        self.subscriptions.read().await.clone()
    }

    async fn save_subscriptions(&self, records: &[SubscriptionRecord]) -> Result<(), StoreError> {
        let _lock = self.write_lock.lock().await;
        *self.subscriptions.write().await = records.to_vec();
        Ok(())
    }

    async fn update_subscriptions<'a>(
        &self,
        edit: SubscriptionEdit<'a>,
    ) -> Result<(), SubscriptionError> {
        let _lock = self.write_lock.lock().await;
        let mut records = self.subscriptions.read().await.clone();
        edit(&mut records)?;
        *self.subscriptions.write().await = records;
        Ok(())
    }

    async fn load_token(&self) -> String {
        self.token.read().await.clone()
    }

    async fn save_token(&self, token: &str) -> Result<(), StoreError> {
        *self.token.write().await = token.to_string();
        Ok(())
    }

    async fn load_port(&self) -> u16 {
        *self.port.read().await
    }

    async fn save_port(&self, port: u16) -> Result<(), StoreError> {
        *self.port.write().await = port;
        Ok(())
    }
}
