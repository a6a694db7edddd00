//! 订阅内容解码
//! 把上游返回的原始文本整理成按行分隔的节点链接

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;

/// 可识别的节点链接前缀
pub const LINK_PREFIXES: [&str; 4] = ["vless://", "vmess://", "trojan://", "ss://"];

// 只校验字符集，不校验长度与填充
static BASE64_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").expect("valid base64 pattern"));

// 上游常省略填充，解码时不强制
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// 是否以可识别的协议前缀开头
pub fn is_proxy_link(text: &str) -> bool {
    LINK_PREFIXES.iter().any(|prefix| text.starts_with(prefix))
}

/// 是否形如 Base64 文本
pub fn looks_like_base64(text: &str) -> bool {
    BASE64_PATTERN.is_match(text)
}

fn decode_base64_text(text: &str) -> Option<String> {
    let bytes = match LENIENT_BASE64.decode(text) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Base64解码失败: {}", e);
            return None;
        }
    };
    String::from_utf8(bytes).ok()
}

/// 解码一份订阅内容
///
/// 依次尝试：
/// 1. 已经是明文链接列表，原样返回
/// 2. 整体 Base64 编码
/// 3. 逐行处理，每行可以是明文链接或单独 Base64 编码的链接
///
/// 都失败时返回原始内容并记录警告，由调用方决定如何处理。
pub fn decode(content: &str) -> String {
    let trimmed = content.trim();

    if is_proxy_link(trimmed) {
        return content.to_string();
    }

    if looks_like_base64(trimmed) {
        if let Some(decoded) = decode_base64_text(trimmed) {
            if is_proxy_link(&decoded) {
                return decoded;
            }

            let links: Vec<&str> = decoded
                .trim()
                .lines()
                .filter(|line| is_proxy_link(line))
                .collect();
            if !links.is_empty() {
                return links.join("\n");
            }
        }
    }

    let mut links = Vec::new();
    for line in trimmed.lines() {
        let line = line.trim();
        if is_proxy_link(line) {
            links.push(line.to_string());
        } else if looks_like_base64(line) {
            if let Some(decoded) = decode_base64_text(line) {
                if is_proxy_link(&decoded) {
                    links.push(decoded);
                }
            }
        }
    }

    if !links.is_empty() {
        return links.join("\n");
    }

    let preview: String = content.chars().take(100).collect();
    tracing::warn!("无法解析订阅内容格式: {}...", preview);
    content.to_string()
}
