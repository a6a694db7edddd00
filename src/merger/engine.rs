//! 订阅合并
//! 并发下载全部订阅，按订阅顺序拼接后去重

use futures::future::join_all;
use std::collections::HashSet;

use super::decoder;
use super::fetcher::SubscriptionFetcher;

/// 合并多个订阅，返回按行分隔、去重后的链接列表
///
/// 下载并发进行，但结果按 `urls` 的顺序拼接，重复链接保留第一次出现的位置。
/// 下载或解码失败的订阅不贡献任何行。
pub async fn merge<F>(fetcher: &F, urls: &[String]) -> String
where
    F: SubscriptionFetcher + ?Sized,
{
    let contents = join_all(urls.iter().map(|url| fetcher.fetch(url))).await;

    let mut merged = Vec::new();
    for content in contents.into_iter().flatten() {
        if content.is_empty() {
            continue;
        }
        let decoded = decoder::decode(&content);
        merged.extend(
            decoded
                .trim()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    dedup_preserving_order(merged).join("\n")
}

/// 去重，保留首次出现的顺序
pub fn dedup_preserving_order(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(links.len());
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::collections::HashMap;
    use std::time::Duration;

    /// 固定返回值的下载器，未登记的 URL 视为下载失败
    #[derive(Default)]
    pub(crate) struct StubFetcher {
        pub(crate) responses: HashMap<String, String>,
        pub(crate) delays: HashMap<String, Duration>,
    }

    impl StubFetcher {
        pub(crate) fn with(mut self, url: &str, body: &str) -> Self {
            self.responses.insert(url.to_string(), body.to_string());
            self
        }

        pub(crate) fn delayed(mut self, url: &str, delay: Duration) -> Self {
            self.delays.insert(url.to_string(), delay);
            self
        }
    }

    #[async_trait]
    impl SubscriptionFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Option<String> {
            if let Some(delay) = self.delays.get(url) {
                tokio::time::sleep(*delay).await;
            }
            self.responses.get(url).cloned()
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_occurrence_wins() {
        let fetcher = StubFetcher::default()
            .with("a", "vless://l1\nvless://l2")
            .with("b", "vless://l2\nvless://l3");
        assert_eq!(
            merge(&fetcher, &urls(&["a", "b"])).await,
            "vless://l1\nvless://l2\nvless://l3"
        );
    }

    #[tokio::test]
    async fn test_failed_subscription_is_skipped() {
        let fetcher = StubFetcher::default().with("a", "vless://l1");
        assert_eq!(merge(&fetcher, &urls(&["a", "b"])).await, "vless://l1");
    }

    #[tokio::test]
    async fn test_order_follows_list_not_completion() {
        // a 完成得更晚，结果仍以 a 在前
        let fetcher = StubFetcher::default()
            .with("a", "trojan://first")
            .with("b", "trojan://second\ntrojan://first")
            .delayed("a", Duration::from_millis(50));
        assert_eq!(
            merge(&fetcher, &urls(&["a", "b"])).await,
            "trojan://first\ntrojan://second"
        );
    }

    #[tokio::test]
    async fn test_mixed_encodings_and_blank_lines() {
        let fetcher = StubFetcher::default()
            .with("a", &STANDARD.encode("vmess://x\n\nss://y\n"))
            .with("b", "ss://y\n  \nvless://z  ")
            .with("c", "");
        assert_eq!(
            merge(&fetcher, &urls(&["a", "b", "c"])).await,
            "vmess://x\nss://y\nvless://z"
        );
    }

    #[tokio::test]
    async fn test_all_failed_yields_empty() {
        let fetcher = StubFetcher::default();
        assert_eq!(merge(&fetcher, &urls(&["a", "b"])).await, "");
    }

    #[test]
    fn test_dedup_preserving_order() {
        let links = urls(&["c", "a", "c", "b", "a"]);
        assert_eq!(dedup_preserving_order(links), urls(&["c", "a", "b"]));
    }
}
