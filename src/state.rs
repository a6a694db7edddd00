use std::sync::Arc;

use crate::core::db::init_db;
use crate::core::models::UpstreamProxyConfig;
use crate::core::storage::{MemoryConfigStore, SqliteConfigStore};
use crate::core::traits::{ConfigStore, StorageConfig};
use crate::merger::{HttpFetcher, SubscriptionFetcher};

/// Web 应用状态
///
/// 只持有存储与下载能力，令牌和订阅列表每次请求都从存储重新读取。
pub struct AppState {
    pub store: Arc<dyn ConfigStore>,
    pub fetcher: Arc<dyn SubscriptionFetcher>,
}

impl AppState {
    pub fn new(store: Arc<dyn ConfigStore>, fetcher: Arc<dyn SubscriptionFetcher>) -> Self {
        Self { store, fetcher }
    }

    /// 打开数据目录下的数据库并导入旧版配置文件
    /// 数据库不可用时回退到内存存储
    pub async fn open<S: StorageConfig>(
        storage: &S,
        upstream_proxy: UpstreamProxyConfig,
    ) -> Result<Self, String> {
        let store: Arc<dyn ConfigStore> = match init_db(&storage.database_path()).await {
            Ok(pool) => {
                let store = SqliteConfigStore::new(pool);
                if let Err(e) = store.migrate_legacy_files(storage).await {
                    tracing::warn!("Failed to migrate legacy config files: {}", e);
                }
                Arc::new(store)
            }
            Err(e) => {
                tracing::error!("{} (falling back to in-memory config store)", e);
                Arc::new(MemoryConfigStore::new())
            }
        };

        let fetcher = Arc::new(HttpFetcher::new(Some(upstream_proxy))?);
        Ok(Self::new(store, fetcher))
    }
}
