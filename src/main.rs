use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use sub_merger::core::models::{SubscriptionSelector, UpstreamProxyConfig};
use sub_merger::core::services::{InfoService, SubscriptionService};
use sub_merger::core::{logger, ConfigStore, DefaultStorageConfig, StorageConfig};
use sub_merger::state::AppState;
use sub_merger::web::WebServer;

/// 简易订阅合并工具
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 数据目录 (默认: ~/.sub_merger/)
    #[arg(short, long, env = "SUB_MERGER_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// 下载订阅时使用的上游代理 (http://, https://, socks5://)
    #[arg(long, env = "SUB_MERGER_UPSTREAM_PROXY", global = true)]
    upstream_proxy: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 启动HTTP服务器
    Start {
        /// 指定HTTP服务器端口 (不保存)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// 添加订阅
    Add { name: String, url: String },
    /// 删除订阅 (URL 或列表序号)
    Remove {
        #[arg(allow_hyphen_values = true)]
        url_or_index: SubscriptionSelector,
    },
    /// 列出所有订阅
    List,
    /// 更新访问令牌
    Token { token: String },
    /// 更新端口
    Port { port: u16 },
    /// 显示订阅信息
    Info,
}

fn outcome(success: bool) -> &'static str {
    if success {
        "成功"
    } else {
        "失败"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let storage = match args.data_dir {
        Some(dir) => DefaultStorageConfig::with_path(dir),
        None => DefaultStorageConfig::new(),
    }
    .map_err(anyhow::Error::msg)
    .context("初始化数据目录失败")?;

    let _log_guard = logger::init_logger(Some(storage.log_dir()));

    let upstream_proxy = UpstreamProxyConfig::from_url(args.upstream_proxy);
    let state = AppState::open(&storage, upstream_proxy)
        .await
        .map_err(anyhow::Error::msg)?;
    let store = state.store.clone();

    match args.command {
        Command::Start { port } => {
            let port = match port {
                Some(port) => port,
                None => store.load_port().await,
            };
            WebServer::new(port, Arc::new(state))
                .run()
                .await
                .map_err(anyhow::Error::msg)?;
        }
        Command::Add { name, url } => {
            let result =
                SubscriptionService::add(store.as_ref(), state.fetcher.as_ref(), &name, &url).await;
            if let Err(e) = &result {
                eprintln!("{}", e);
            }
            println!("添加订阅 {}", outcome(result.is_ok()));
        }
        Command::Remove { url_or_index } => {
            let result = SubscriptionService::remove(store.as_ref(), &url_or_index).await;
            if let Err(e) = &result {
                eprintln!("{}", e);
            }
            println!("删除订阅 {}", outcome(result.is_ok()));
        }
        Command::List => {
            let subs = SubscriptionService::list(store.as_ref()).await;
            if subs.is_empty() {
                println!("没有配置订阅");
            }
            for (i, sub) in subs.iter().enumerate() {
                println!("{}. {} - {} (添加于 {})", i, sub.name, sub.url, sub.added_at);
            }
        }
        Command::Token { token } => {
            let token = token.trim();
            if token.is_empty() {
                bail!("访问令牌不能为空");
            }
            let result = store.save_token(token).await;
            if let Err(e) = &result {
                eprintln!("{}", e);
            }
            println!("更新访问令牌 {}", outcome(result.is_ok()));
        }
        Command::Port { port } => {
            let result = store.save_port(port).await;
            if let Err(e) = &result {
                eprintln!("{}", e);
            }
            println!("更新端口 {}", outcome(result.is_ok()));
        }
        Command::Info => {
            let info = InfoService::collect(store.as_ref()).await;
            println!("服务器IP: {}", info.server_ip);
            println!("端口: {}", info.port);
            println!("访问令牌: {}", info.token);
            println!("\n订阅链接:");
            for link in &info.links {
                println!("  {}: {}", link.client.to_uppercase(), link.url);
            }
            println!("\n配置的订阅源:");
            for (i, sub) in info.subscriptions.iter().enumerate() {
                println!("  {}. {} - {}", i, sub.name, sub.url);
            }
        }
    }

    Ok(())
}
