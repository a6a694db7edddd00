//! 订阅下载客户端

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;

use crate::core::error::FetchError;
use crate::core::models::UpstreamProxyConfig;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// 下载单个订阅的原始文本
///
/// 失败返回 `None`，由调用方跳过该订阅，不中断整批合并。
#[async_trait]
pub trait SubscriptionFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<String>;
}

/// 基于 reqwest 的实现
pub struct HttpFetcher {
    http_client: Client,
}

impl HttpFetcher {
    pub fn new(proxy_config: Option<UpstreamProxyConfig>) -> Result<Self, String> {
        let mut builder = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT);

        match proxy_config {
            Some(config) if config.enabled && !config.url.is_empty() => {
                match reqwest::Proxy::all(&config.url) {
                    Ok(proxy) => {
                        builder = builder.proxy(proxy);
                        tracing::info!("订阅下载使用上游代理: {}", config.url);
                    }
                    Err(e) => {
                        tracing::warn!("上游代理地址无效，已忽略: {} ({})", config.url, e);
                        builder = builder.no_proxy();
                    }
                }
            }
            _ => builder = builder.no_proxy(),
        }

        let http_client = builder
            .build()
            .map_err(|e| format!("创建 HTTP 客户端失败: {}", e))?;
        Ok(Self { http_client })
    }

    /// 下载并返回去掉首尾空白的正文
    ///
    /// 正文按 UTF-8 严格解码，不做字符集探测。
    pub async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .http_client
            .get(url)
            .header(header::ACCEPT, ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let bytes = response.bytes().await?;
        let body = String::from_utf8(bytes.to_vec())?;
        Ok(body.trim().to_string())
    }
}

#[async_trait]
impl SubscriptionFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        match self.try_fetch(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::error!("下载订阅 {} 失败: {}", url, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};

    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route("/ok", get(|| async { "\n  vless://a@h:1\n" }))
            .route(
                "/agent",
                get(|headers: axum::http::HeaderMap| async move {
                    headers
                        .get(header::USER_AGENT)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                }),
            )
            .route(
                "/binary",
                get(|| async { vec![0xffu8, 0xfe, b'v', b'l'] }),
            )
            .route(
                "/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_trims_body() {
        let base = spawn_upstream().await;
        let fetcher = HttpFetcher::new(None).unwrap();
        assert_eq!(
            fetcher.fetch(&format!("{}/ok", base)).await.as_deref(),
            Some("vless://a@h:1")
        );
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_user_agent() {
        let base = spawn_upstream().await;
        let fetcher = HttpFetcher::new(None).unwrap();
        assert_eq!(
            fetcher.fetch(&format!("{}/agent", base)).await.as_deref(),
            Some(USER_AGENT)
        );
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let base = spawn_upstream().await;
        let fetcher = HttpFetcher::new(None).unwrap();
        let result = fetcher.try_fetch(&format!("{}/broken", base)).await;
        assert!(matches!(result, Err(FetchError::Status(s)) if s == StatusCode::INTERNAL_SERVER_ERROR));
        assert!(fetcher.fetch(&format!("{}/broken", base)).await.is_none());
    }

    #[tokio::test]
    async fn test_non_utf8_body_is_failure() {
        let base = spawn_upstream().await;
        let fetcher = HttpFetcher::new(None).unwrap();
        let url = format!("{}/binary", base);
        assert!(matches!(fetcher.try_fetch(&url).await, Err(FetchError::Body(_))));
        assert!(fetcher.fetch(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_failure() {
        // 先占用再释放端口，保证无人监听
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(None).unwrap();
        assert!(fetcher.fetch(&format!("http://{}/sub", addr)).await.is_none());
    }

    #[test]
    fn test_invalid_upstream_proxy_is_ignored() {
        let config = UpstreamProxyConfig {
            enabled: true,
            url: "::not a url::".to_string(),
        };
        assert!(HttpFetcher::new(Some(config)).is_ok());
    }
}
