//! 核心 trait 定义
//! 用于解耦业务逻辑与具体存储/运行时

use async_trait::async_trait;
use std::path::PathBuf;

use crate::core::error::{StoreError, SubscriptionError};
use crate::core::models::SubscriptionRecord;

/// 存储配置 trait
/// 抽象数据目录和文件系统布局
pub trait StorageConfig: Send + Sync {
    /// 获取数据目录路径
    fn data_dir(&self) -> PathBuf;

    /// SQLite 数据库文件
    fn database_path(&self) -> PathBuf {
        self.data_dir().join("sub_merger.db")
    }

    /// 日志目录
    fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    /// 旧版订阅列表文件
    fn legacy_subscriptions_path(&self) -> PathBuf {
        self.data_dir().join("subscriptions.json")
    }

    /// 旧版访问令牌文件
    fn legacy_token_path(&self) -> PathBuf {
        self.data_dir().join("access_token.txt")
    }

    /// 旧版端口文件
    fn legacy_port_path(&self) -> PathBuf {
        self.data_dir().join("port.txt")
    }
}

/// 默认存储配置 (使用 ~/.sub_merger/)
#[derive(Debug, Clone)]
pub struct DefaultStorageConfig {
    data_dir: PathBuf,
}

impl DefaultStorageConfig {
    pub fn new() -> Result<Self, String> {
        let home = dirs::home_dir().ok_or_else(|| "无法获取用户主目录".to_string())?;
        Self::with_path(home.join(".sub_merger"))
    }

    /// 从指定路径创建
    pub fn with_path(data_dir: PathBuf) -> Result<Self, String> {
        std::fs::create_dir_all(&data_dir).map_err(|e| format!("创建数据目录失败: {}", e))?;
        Ok(Self { data_dir })
    }
}

impl StorageConfig for DefaultStorageConfig {
    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }
}

/// 对订阅列表做一次读-改-写的编辑函数
pub type SubscriptionEdit<'a> =
    Box<dyn FnOnce(&mut Vec<SubscriptionRecord>) -> Result<(), SubscriptionError> + Send + 'a>;

/// 配置存储能力：订阅列表、访问令牌、端口
///
/// 读操作不返回错误：存储不可读时记录日志并回退到默认值，
/// 调用方每次请求都重新读取，带外修改无需重启即可生效。
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// 按添加顺序列出订阅
    async fn list_subscriptions(&self) -> Vec<SubscriptionRecord>;

    /// 整体覆盖订阅列表
    async fn save_subscriptions(&self, records: &[SubscriptionRecord]) -> Result<(), StoreError>;

    /// 在存储自身的互斥锁内完成 读取 → 编辑 → 保存
    /// 编辑函数返回错误时不写入
    async fn update_subscriptions<'a>(
        &self,
        edit: SubscriptionEdit<'a>,
    ) -> Result<(), SubscriptionError>;

    async fn load_token(&self) -> String;

    async fn save_token(&self, token: &str) -> Result<(), StoreError>;

    async fn load_port(&self) -> u16;

    async fn save_port(&self, port: u16) -> Result<(), StoreError>;
}
