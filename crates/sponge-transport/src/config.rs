use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// 默认入站暂存容量：64 KiB。
pub const DEFAULT_RECV_CAPACITY: usize = 64 * 1024;
/// 默认建连时限。
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// `TcpChannel` 的可调参数。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 入站暂存区的容量即单次从套接字读取的上限，是通道层面的流量控制旋钮；
/// - 时限属于外围传输循环而非字节流本身，因此集中在这里配置。
///
/// ## 契约说明（What）
/// - `recv_capacity`：必须大于 0，`TcpChannel::connect` 会拒绝 0；
/// - `connect_timeout_ms`：建连时限，毫秒；
/// - `read_timeout_ms`：单次套接字读取时限，`None` 表示不限时；
/// - 支持从 TOML 反序列化，缺省字段取 [`Default`] 中的值。
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelConfig {
    pub recv_capacity: usize,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: Option<u64>,
}

/// 配置加载失败。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse channel config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            recv_capacity: DEFAULT_RECV_CAPACITY,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: None,
        }
    }
}

impl ChannelConfig {
    /// 从 TOML 文本加载配置，未出现的字段保持默认值。
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn with_recv_capacity(mut self, capacity: usize) -> Self {
        self.recv_capacity = capacity;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = duration_to_millis(timeout);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout_ms = timeout.map(duration_to_millis);
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ChannelConfig::from_toml_str("recv_capacity = 512\n").expect("合法配置");
        assert_eq!(config.recv_capacity, 512);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.read_timeout(), None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ChannelConfig::from_toml_str("recv_capacty = 1\n").expect_err("拼写错误应被拒绝");
        assert!(err.to_string().contains("recv_capacty"));
    }

    #[test]
    fn builders_round_trip_through_millis() {
        let config = ChannelConfig::default()
            .with_connect_timeout(Duration::from_millis(1500))
            .with_read_timeout(Some(Duration::from_secs(2)));
        assert_eq!(config.connect_timeout_ms, 1500);
        assert_eq!(config.read_timeout(), Some(Duration::from_secs(2)));
    }
}
