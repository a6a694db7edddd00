//! Web 服务器

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::build_routes;
use crate::state::AppState;

/// Web 服务器
pub struct WebServer {
    port: u16,
    state: Arc<AppState>,
}

impl WebServer {
    pub fn new(port: u16, state: Arc<AppState>) -> Self {
        Self { port, state }
    }

    /// 启动服务器，直到收到 Ctrl-C
    pub async fn run(self) -> Result<(), String> {
        let app = build_routes(self.state);

        // 默认监听所有网卡，供外部客户端拉取订阅
        let bind_addr = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string());
        let addr: SocketAddr = format!("{}:{}", bind_addr, self.port)
            .parse()
            .map_err(|e| format!("无效的地址: {}", e))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| format!("绑定端口失败: {}", e))?;

        tracing::info!("HTTP服务器正在 {} 上运行...", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| format!("服务器错误: {}", e))?;

        tracing::info!("HTTP服务器已关闭");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("监听退出信号失败: {}", e);
        std::future::pending::<()>().await;
    }
}
