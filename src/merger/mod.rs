//! 订阅合并流水线：下载 → 解码 → 合并去重 → 按客户端编码

pub mod decoder;
pub mod encoder;
pub mod engine;
pub mod fetcher;

pub use decoder::{decode, is_proxy_link, LINK_PREFIXES};
pub use encoder::{encode, CLIENT_TYPES, DEFAULT_CLIENT_TYPE};
pub use engine::merge;
pub use fetcher::{HttpFetcher, SubscriptionFetcher};
