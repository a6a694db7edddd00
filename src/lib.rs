//! 订阅合并服务
//!
//! 拉取多个订阅源，解码、合并去重后通过 HTTP 按客户端格式重新发布。

pub mod api;
pub mod core;
pub mod merger;
pub mod state;
pub mod web;
