use core::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::net::lookup_host;

use crate::error::TransportError;

/// `Address` 表示一个已解析、可直接用于建连的网络端点。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 建连阶段只需要“名字 + 服务 → 端点”这一步；之后所有组件都只面对数值地址，
///   不再关心解析来源。
/// - 同时保留 IPv4 数值形式的互转，便于上层以 `u32` 记录或比较地址。
///
/// ## 合同（What）
/// - `Display` 输出稳定的 `ip:port` 文本（IPv6 带方括号），适合日志；
/// - 相等性按地址与端口的值比较；
/// - [`resolve`](Self::resolve) 至少返回一个端点，否则返回错误。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(SocketAddr);

/// 已知服务名到端口的映射，覆盖 CLI 场景中常见的条目。
const WELL_KNOWN_SERVICES: &[(&str, u16)] = &[
    ("ftp", 21),
    ("ssh", 22),
    ("telnet", 23),
    ("smtp", 25),
    ("domain", 53),
    ("http", 80),
    ("https", 443),
];

impl Address {
    /// 将主机名（或字面地址）与服务名（或端口号）解析为端点列表。
    ///
    /// # 逻辑解析（How）
    /// 1. 将 `service` 转换为端口：优先按十进制数字解析，其次查已知服务表；
    /// 2. 交由 `tokio::net::lookup_host` 执行系统解析；
    /// 3. 去重后按 IPv4 优先排序，保持同族内的系统返回顺序。
    ///
    /// # 合同
    /// - 成功时列表非空；
    /// - 服务名未知返回 [`TransportError::UnknownService`]，解析失败返回
    ///   [`TransportError::Resolve`]，结果为空返回 [`TransportError::NoAddress`]。
    pub async fn resolve(host: &str, service: &str) -> Result<Vec<Self>, TransportError> {
        let port = service_port(service)?;
        let resolved = lookup_host((host, port))
            .await
            .map_err(|source| TransportError::Resolve {
                host: host.to_owned(),
                service: service.to_owned(),
                source,
            })?;

        let mut addresses: Vec<Self> = Vec::new();
        for addr in resolved {
            let addr = Self(addr);
            if !addresses.contains(&addr) {
                addresses.push(addr);
            }
        }
        addresses.sort_by_key(|addr| !addr.0.is_ipv4());

        if addresses.is_empty() {
            return Err(TransportError::NoAddress {
                host: host.to_owned(),
                service: service.to_owned(),
            });
        }
        tracing::debug!(host, service, count = addresses.len(), "resolved endpoints");
        Ok(addresses)
    }

    /// 由数字形式的 IP 与端口构造地址，不做任何名称解析。
    pub fn from_ip_port(ip: &str, port: u16) -> Result<Self, TransportError> {
        let ip: IpAddr = ip
            .parse()
            .map_err(|_| TransportError::InvalidAddress(ip.to_owned()))?;
        Ok(Self(SocketAddr::new(ip, port)))
    }

    /// 由主机序的 IPv4 数值构造地址，端口为 0。
    pub fn from_ipv4_numeric(ip: u32) -> Self {
        Self(SocketAddr::new(IpAddr::V4(Ipv4Addr::from(ip)), 0))
    }

    /// 返回主机序的 IPv4 数值；IPv6 地址返回 [`TransportError::NotIpv4`]。
    pub fn ipv4_numeric(&self) -> Result<u32, TransportError> {
        match self.0.ip() {
            IpAddr::V4(v4) => Ok(u32::from(v4)),
            IpAddr::V6(_) => Err(TransportError::NotIpv4(*self)),
        }
    }

    /// 拆分为文本形式的 IP 与端口。
    pub fn ip_port(&self) -> (String, u16) {
        (self.0.ip().to_string(), self.0.port())
    }

    pub fn port(&self) -> u16 {
        self.0.port()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl From<Address> for SocketAddr {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

/// 解析 `host`/`service` 并返回首选端点。
pub async fn resolve(host: &str, service: &str) -> Result<Address, TransportError> {
    let addresses = Address::resolve(host, service).await?;
    addresses
        .into_iter()
        .next()
        .ok_or_else(|| TransportError::NoAddress {
            host: host.to_owned(),
            service: service.to_owned(),
        })
}

/// 将服务名转换为端口号。
pub(crate) fn service_port(service: &str) -> Result<u16, TransportError> {
    if let Ok(port) = service.parse::<u16>() {
        return Ok(port);
    }
    let name = service.to_ascii_lowercase();
    WELL_KNOWN_SERVICES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, port)| *port)
        .ok_or_else(|| TransportError::UnknownService(service.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_names_and_numbers_map_to_ports() {
        assert_eq!(service_port("http").expect("http"), 80);
        assert_eq!(service_port("HTTPS").expect("https"), 443);
        assert_eq!(service_port("8080").expect("numeric"), 8080);
        assert!(matches!(
            service_port("gopher+"),
            Err(TransportError::UnknownService(name)) if name == "gopher+"
        ));
        assert!(service_port("70000").is_err(), "超出 u16 的端口不是合法服务");
    }

    #[test]
    fn ipv4_numeric_round_trips() {
        let addr = Address::from_ip_port("1.2.3.4", 80).expect("literal");
        assert_eq!(addr.ipv4_numeric().expect("ipv4"), 0x0102_0304);
        let back = Address::from_ipv4_numeric(0x0102_0304);
        assert_eq!(back.ip_port(), ("1.2.3.4".to_owned(), 0));
        assert_eq!(addr.to_string(), "1.2.3.4:80");
    }

    #[test]
    fn ipv6_has_no_ipv4_numeric_form() {
        let addr = Address::from_ip_port("::1", 443).expect("ipv6 literal");
        assert!(matches!(addr.ipv4_numeric(), Err(TransportError::NotIpv4(_))));
        assert_eq!(addr.to_string(), "[::1]:443");
    }

    #[test]
    fn hostnames_are_not_numeric_addresses() {
        assert!(matches!(
            Address::from_ip_port("example.com", 80),
            Err(TransportError::InvalidAddress(_))
        ));
    }
}
