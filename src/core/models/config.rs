//! 持久化配置项及默认值

/// 存储为空时使用的访问令牌
pub const DEFAULT_TOKEN: &str = "554365";

/// 存储为空时使用的监听端口
pub const DEFAULT_PORT: u16 = 25500;

/// configs 表中的键
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const PORT: &str = "port";
    pub const LEGACY_MIGRATED: &str = "legacy_migrated";
}
