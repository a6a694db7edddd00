//! 上游代理配置

use serde::{Deserialize, Serialize};

/// 下载订阅时使用的上游代理
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    /// 是否启用
    pub enabled: bool,
    /// 代理地址 (http://, https://, socks5://)
    pub url: String,
}

impl UpstreamProxyConfig {
    pub fn from_url(url: Option<String>) -> Self {
        match url.filter(|u| !u.trim().is_empty()) {
            Some(url) => Self {
                enabled: true,
                url: url.trim().to_string(),
            },
            None => Self::default(),
        }
    }
}
