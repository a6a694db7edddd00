//! 配置存储实现

mod config;
mod memory;

pub use config::SqliteConfigStore;
pub use memory::MemoryConfigStore;
