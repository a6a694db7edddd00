//! 核心数据模型

mod config;
mod proxy_config;
mod subscription;

pub use config::{keys, DEFAULT_PORT, DEFAULT_TOKEN};
pub use proxy_config::UpstreamProxyConfig;
pub use subscription::{SubscriptionRecord, SubscriptionSelector, ADDED_AT_FORMAT};
