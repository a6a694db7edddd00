//! 订阅服务
//! 订阅源的添加、删除、列出

use crate::core::error::SubscriptionError;
use crate::core::models::{SubscriptionRecord, SubscriptionSelector};
use crate::core::traits::ConfigStore;
use crate::merger::{decoder, SubscriptionFetcher};

/// 订阅服务
pub struct SubscriptionService;

impl SubscriptionService {
    /// 列出所有订阅
    pub async fn list(store: &dyn ConfigStore) -> Vec<SubscriptionRecord> {
        store.list_subscriptions().await
    }

    /// 添加订阅
    ///
    /// 先实际下载并解码一次，内容中没有可识别的链接则拒绝，存储保持不变。
    pub async fn add(
        store: &dyn ConfigStore,
        fetcher: &dyn SubscriptionFetcher,
        name: &str,
        url: &str,
    ) -> Result<SubscriptionRecord, SubscriptionError> {
        if store.list_subscriptions().await.iter().any(|s| s.url == url) {
            tracing::warn!("订阅 {} 已存在", url);
            return Err(SubscriptionError::Duplicate(url.to_string()));
        }

        let content = match fetcher.fetch(url).await {
            Some(content) if !content.is_empty() => content,
            _ => {
                tracing::error!("无法下载订阅: {}", url);
                return Err(SubscriptionError::Unreachable(url.to_string()));
            }
        };

        let decoded = decoder::decode(&content);
        if !decoder::is_proxy_link(decoded.trim_start()) {
            tracing::error!("订阅内容格式无效: {}", url);
            return Err(SubscriptionError::InvalidContent(url.to_string()));
        }

        let record = SubscriptionRecord::new(name, url);
        let pending = record.clone();
        // 下载期间可能有并发添加，锁内再查一次
        store
            .update_subscriptions(Box::new(move |list: &mut Vec<SubscriptionRecord>| {
                if list.iter().any(|s| s.url == pending.url) {
                    return Err(SubscriptionError::Duplicate(pending.url));
                }
                list.push(pending);
                Ok(())
            }))
            .await?;

        tracing::info!("已添加订阅 {} - {}", record.name, record.url);
        Ok(record)
    }

    /// 按下标或 URL 删除订阅，返回被删除的记录
    pub async fn remove(
        store: &dyn ConfigStore,
        selector: &SubscriptionSelector,
    ) -> Result<SubscriptionRecord, SubscriptionError> {
        let mut removed = None;

        let result = store
            .update_subscriptions(Box::new(|list: &mut Vec<SubscriptionRecord>| {
                if list.is_empty() {
                    return Err(SubscriptionError::Empty);
                }

                let position = match selector {
                    SubscriptionSelector::Index(index) if *index < list.len() => Some(*index),
                    SubscriptionSelector::Index(_) => None,
                    SubscriptionSelector::Url(url) => list.iter().position(|s| &s.url == url),
                };

                match position {
                    Some(position) => {
                        removed = Some(list.remove(position));
                        Ok(())
                    }
                    None => Err(SubscriptionError::NotFound(selector.to_string())),
                }
            }))
            .await;

        if let Err(e) = result {
            tracing::warn!("{}", e);
            return Err(e);
        }

        removed.ok_or_else(|| SubscriptionError::NotFound(selector.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryConfigStore;
    use crate::merger::engine::tests::StubFetcher;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn record(name: &str, url: &str) -> SubscriptionRecord {
        SubscriptionRecord {
            name: name.to_string(),
            url: url.to_string(),
            added_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_valid_subscription() {
        let store = MemoryConfigStore::new();
        let fetcher = StubFetcher::default().with("https://a", &STANDARD.encode("vless://x"));

        let added = SubscriptionService::add(&store, &fetcher, "A", "https://a")
            .await
            .unwrap();

        assert_eq!(added.name, "A");
        assert_eq!(store.list_subscriptions().await, vec![added]);
    }

    #[tokio::test]
    async fn test_add_rejects_unrecognized_content() {
        let existing = vec![record("old", "https://old")];
        let store = MemoryConfigStore::with_subscriptions(existing.clone());
        let fetcher = StubFetcher::default().with("https://bad", "<html>nothing here</html>");

        let result = SubscriptionService::add(&store, &fetcher, "bad", "https://bad").await;

        assert!(matches!(result, Err(SubscriptionError::InvalidContent(_))));
        assert_eq!(store.list_subscriptions().await, existing);
    }

    #[tokio::test]
    async fn test_add_rejects_unreachable_and_duplicate() {
        let store = MemoryConfigStore::with_subscriptions(vec![record("old", "https://old")]);
        let fetcher = StubFetcher::default().with("https://old", "vless://x");

        let result = SubscriptionService::add(&store, &fetcher, "new", "https://down").await;
        assert!(matches!(result, Err(SubscriptionError::Unreachable(_))));

        let result = SubscriptionService::add(&store, &fetcher, "again", "https://old").await;
        assert!(matches!(result, Err(SubscriptionError::Duplicate(_))));

        assert_eq!(store.list_subscriptions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_by_index_and_url() {
        let store = MemoryConfigStore::with_subscriptions(vec![
            record("a", "https://a"),
            record("b", "https://b"),
            record("c", "https://c"),
        ]);

        let removed = SubscriptionService::remove(&store, &SubscriptionSelector::Index(1))
            .await
            .unwrap();
        assert_eq!(removed.url, "https://b");

        let removed =
            SubscriptionService::remove(&store, &SubscriptionSelector::Url("https://c".into()))
                .await
                .unwrap();
        assert_eq!(removed.url, "https://c");

        assert_eq!(
            SubscriptionService::list(&store).await,
            vec![record("a", "https://a")]
        );
    }

    #[tokio::test]
    async fn test_remove_missing() {
        let store = MemoryConfigStore::new();
        let result = SubscriptionService::remove(&store, &SubscriptionSelector::Index(0)).await;
        assert!(matches!(result, Err(SubscriptionError::Empty)));

        store
            .save_subscriptions(&[record("a", "https://a")])
            .await
            .unwrap();
        let result = SubscriptionService::remove(&store, &SubscriptionSelector::Index(5)).await;
        assert!(matches!(result, Err(SubscriptionError::NotFound(_))));
        let result =
            SubscriptionService::remove(&store, &SubscriptionSelector::Url("https://z".into()))
                .await;
        assert!(matches!(result, Err(SubscriptionError::NotFound(_))));
        assert_eq!(store.list_subscriptions().await.len(), 1);
    }
}
