use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::any::Any;
use thiserror::Error;

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// 请求处理中的失败，统一转换为纯文本响应
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("访问令牌无效")]
    Forbidden,

    #[error("未配置订阅源")]
    NoSubscriptions,

    #[error("未找到请求的资源")]
    NotFound,

    #[error("服务器内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NoSubscriptions | Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!("处理请求失败: {}", detail);
        }
        plain_text(self.status(), self.to_string())
    }
}

pub fn plain_text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)], body.into()).into_response()
}

/// 处理器 panic 时返回 500，监听循环不受影响
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(detail).into_response()
}

pub async fn request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = req.method().clone();
    // 不记录 query，避免令牌进入日志
    let path = req.uri().path().to_string();
    let start = std::time::Instant::now();
    let response = next.run(req).await;
    let duration = start.elapsed();
    tracing::info!(
        "{} {} - status: {}, latency: {}ms",
        method,
        path,
        response.status(),
        duration.as_millis()
    );
    response
}
