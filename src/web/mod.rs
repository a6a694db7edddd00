//! Web 服务器模块
//! 提供订阅合并的 HTTP 服务

pub mod server;

pub use server::WebServer;
