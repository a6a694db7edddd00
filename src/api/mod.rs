use crate::state::AppState;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

pub mod common;
mod sub;

pub use sub::{SubQuery, SUBSCRIPTION_USERINFO};

pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // 合并订阅 (需要令牌)
        .route("/sub", get(sub::handle_sub))
        // Health
        .route("/ping", get(sub::handle_ping))
        .fallback(sub::handle_not_found)
        .layer(CatchPanicLayer::custom(common::handle_panic))
        .layer(axum::middleware::from_fn(common::request_logger))
        .with_state(state)
}
