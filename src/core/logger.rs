//! 日志系统
//! 终端输出 + 按天滚动的日志文件

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "sub_merger.log";

// 本地时区时间格式化器
struct LocalTimer;

impl fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().to_rfc3339())
    }
}

/// 初始化日志系统
///
/// `log_dir` 不可写时降级为只输出到终端。
/// 返回的 guard 需要持有到进程退出，否则文件日志可能丢失尾部。
pub fn init_logger(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    // 捕获 log 宏日志
    let _ = tracing_log::LogTracer::init();

    let mut file_guard = None;
    let mut file_layer = None;

    if let Some(dir) = log_dir {
        if prepare_log_dir(&dir) {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            file_guard = Some(guard);
            file_layer = Some(
                fmt::Layer::new()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true)
                    .with_timer(LocalTimer),
            );
        } else {
            eprintln!("日志目录不可写，已降级为控制台输出");
        }
    }

    let console_layer = fmt::Layer::new()
        .with_target(false)
        .with_level(true)
        .with_timer(LocalTimer);

    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if file_guard.is_some() {
        info!("日志系统已完成初始化 (终端控制台 + 文件持久化)");
    } else {
        info!("日志系统已完成初始化 (终端控制台)");
    }
    file_guard
}

fn prepare_log_dir(dir: &Path) -> bool {
    if fs::create_dir_all(dir).is_err() {
        return false;
    }

    let probe = dir.join(".write_test");
    let result = fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&probe)
        .and_then(|mut f| f.write_all(b"ok"));

    if result.is_ok() {
        let _ = fs::remove_file(probe);
        true
    } else {
        false
    }
}
