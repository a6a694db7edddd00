//! 错误类型定义

use thiserror::Error;

/// 下载订阅失败
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("上游返回状态码 {0}")]
    Status(reqwest::StatusCode),

    #[error("响应正文不是有效的 UTF-8: {0}")]
    Body(#[from] std::string::FromUtf8Error),
}

/// 配置存储读写失败
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 订阅管理操作失败
#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("订阅已存在: {0}")]
    Duplicate(String),

    #[error("无法下载订阅: {0}")]
    Unreachable(String),

    #[error("订阅内容格式无效: {0}")]
    InvalidContent(String),

    #[error("未找到订阅: {0}")]
    NotFound(String),

    #[error("没有订阅可删除")]
    Empty,

    #[error("保存订阅失败: {0}")]
    Storage(#[from] StoreError),
}
