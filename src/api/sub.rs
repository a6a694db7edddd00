use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::common::{plain_text, ApiError, TEXT_PLAIN_UTF8};
use crate::merger::{encode, merge, DEFAULT_CLIENT_TYPE};
use crate::state::AppState;

/// 订阅导入客户端约定的用量头：未用量 0，总量 10 GiB，到期时间 2038 年
pub const SUBSCRIPTION_USERINFO: &str =
    "upload=0; download=0; total=10737418240; expire=2147483647";

/// `/sub` 的查询参数
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SubQuery {
    pub token: Option<String>,
    pub target: Option<String>,
}

impl SubQuery {
    /// 同名参数取第一个非空值，空值视为未提供
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "token" => &mut parsed.token,
                "target" => &mut parsed.target,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        parsed
    }
}

/// GET /sub?token=<T>&target=<type>
pub async fn handle_sub(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let params = SubQuery::parse(query.as_deref().unwrap_or_default());

    let token = state.store.load_token().await;
    if params.token.as_deref() != Some(token.as_str()) {
        return Err(ApiError::Forbidden);
    }

    let target = params
        .target
        .unwrap_or_else(|| DEFAULT_CLIENT_TYPE.to_string())
        .to_lowercase();

    let urls: Vec<String> = state
        .store
        .list_subscriptions()
        .await
        .into_iter()
        .map(|sub| sub.url)
        .collect();
    if urls.is_empty() {
        return Err(ApiError::NoSubscriptions);
    }

    let merged = merge(state.fetcher.as_ref(), &urls).await;
    let body = encode(&merged, &target);
    tracing::debug!(
        "Merged {} subscriptions for target {} ({} bytes)",
        urls.len(),
        target,
        body.len()
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)
        .header("Subscription-Userinfo", SUBSCRIPTION_USERINFO)
        .body(Body::from(body))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// GET /ping
pub async fn handle_ping() -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("pong"))
        .unwrap_or_else(|e| ApiError::Internal(e.to_string()).into_response())
}

pub async fn handle_not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, ApiError::NotFound.to_string())
}
