//! 订阅信息服务
//! 探测服务器外网 IP，生成各客户端的订阅链接

use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::net::UdpSocket;

use crate::core::models::SubscriptionRecord;
use crate::core::traits::ConfigStore;
use crate::merger::CLIENT_TYPES;

const IP_ECHO_SERVICES: [&str; 2] = ["https://api.ipify.org", "https://ifconfig.me"];
const IP_ECHO_TIMEOUT: Duration = Duration::from_secs(5);

/// 单个客户端的订阅链接
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientLink {
    pub client: String,
    pub url: String,
}

/// 订阅信息汇总
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionInfo {
    pub server_ip: IpAddr,
    pub port: u16,
    pub token: String,
    pub links: Vec<ClientLink>,
    pub subscriptions: Vec<SubscriptionRecord>,
}

/// 信息服务
pub struct InfoService;

impl InfoService {
    /// 汇总服务器地址、令牌、订阅链接和已配置的订阅源
    pub async fn collect(store: &dyn ConfigStore) -> SubscriptionInfo {
        let server_ip = detect_external_ip(&IP_ECHO_SERVICES).await;
        let port = store.load_port().await;
        let token = store.load_token().await;

        SubscriptionInfo {
            server_ip,
            port,
            links: generate_subscription_links(server_ip, port, &token),
            token,
            subscriptions: store.list_subscriptions().await,
        }
    }
}

/// 为每种客户端生成订阅链接
pub fn generate_subscription_links(server_ip: IpAddr, port: u16, token: &str) -> Vec<ClientLink> {
    let host = match server_ip {
        IpAddr::V4(ip) => ip.to_string(),
        IpAddr::V6(ip) => format!("[{}]", ip),
    };
    let base_url = format!("http://{}:{}/sub?token={}", host, port, token);

    CLIENT_TYPES
        .iter()
        .map(|client| ClientLink {
            client: client.to_string(),
            url: format!("{}&target={}", base_url, client),
        })
        .collect()
}

/// 探测外网 IP
///
/// 依次询问 IP 回显服务，都失败时取本机出口网卡地址，最后回退到 127.0.0.1。
pub async fn detect_external_ip(services: &[&str]) -> IpAddr {
    let client = reqwest::Client::builder()
        .timeout(IP_ECHO_TIMEOUT)
        .user_agent(concat!("sub-merger/", env!("CARGO_PKG_VERSION")))
        .build();

    if let Ok(client) = client {
        for service in services {
            match query_ip_echo(&client, service).await {
                Ok(ip) => return ip,
                Err(e) => tracing::error!("获取外部IP失败 ({}): {}", service, e),
            }
        }
    }

    match local_interface_ip().await {
        Ok(ip) => ip,
        Err(e) => {
            tracing::warn!("获取本机出口地址失败: {}", e);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

async fn query_ip_echo(client: &reqwest::Client, url: &str) -> Result<IpAddr, String> {
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("状态码 {}", response.status()));
    }
    let body = response.text().await.map_err(|e| e.to_string())?;
    body.trim()
        .parse()
        .map_err(|_| format!("返回内容不是 IP 地址: {}", body.trim()))
}

/// UDP connect 不发送数据，只用来让系统选出出口地址
async fn local_interface_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect("10.255.255.255:1").await?;
    Ok(socket.local_addr()?.ip())
}
