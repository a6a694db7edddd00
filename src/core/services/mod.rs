//! 核心服务层
//! 订阅管理与信息汇总，HTTP 服务与命令行共用

pub mod info;
pub mod subscription;

pub use info::{ClientLink, InfoService, SubscriptionInfo};
pub use subscription::SubscriptionService;
