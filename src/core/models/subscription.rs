//! 订阅源记录

use serde::{Deserialize, Serialize};

/// `added_at` 的存储格式
pub const ADDED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 一条订阅源，创建后不可修改，只能删除
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub name: String,
    pub url: String,
    pub added_at: String,
}

impl SubscriptionRecord {
    /// 以当前本地时间创建记录
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            added_at: chrono::Local::now().format(ADDED_AT_FORMAT).to_string(),
        }
    }
}

/// 删除订阅时的定位方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionSelector {
    /// 按当前列表顺序的下标
    Index(usize),
    /// 按 URL 精确匹配
    Url(String),
}

impl std::str::FromStr for SubscriptionSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<usize>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Url(s.to_string()),
        })
    }
}

impl std::fmt::Display for SubscriptionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{}", index),
            Self::Url(url) => f.write_str(url),
        }
    }
}
