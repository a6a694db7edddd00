//! 核心模块
//! 包含存储、模型与业务服务

pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod services;
pub mod storage;
pub mod traits;

// 重导出常用类型
pub use error::{FetchError, StoreError, SubscriptionError};
pub use traits::{ConfigStore, DefaultStorageConfig, StorageConfig};
