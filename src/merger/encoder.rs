//! 按客户端类型输出订阅

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// 支持的客户端类型，同时决定信息页中链接的展示顺序
pub const CLIENT_TYPES: [&str; 5] = ["v2ray", "clash", "shadowrocket", "surge", "quanx"];

/// 未指定 target 时使用的客户端类型
pub const DEFAULT_CLIENT_TYPE: &str = "v2ray";

/// 已知客户端类型整体 Base64 编码，其余类型或空内容原样返回
pub fn encode(content: &str, client_type: &str) -> String {
    let known = CLIENT_TYPES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(client_type));

    if known && !content.is_empty() {
        STANDARD.encode(content.as_bytes())
    } else {
        content.to_string()
    }
}
