use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use sponge_transport::ChannelConfig;

/// `webget HOST PATH`：请求 `http://HOST/PATH` 并把响应原样写到标准输出。
///
/// 除两个位置参数外，其余选项均可省略；命令行取值优先于环境变量，
/// 环境变量优先于 `--config` 指向的 TOML 文件，文件优先于内置默认值。
#[derive(Debug, Parser)]
#[command(
    name = "webget",
    version,
    about = "Fetch a URL over a plain TCP byte channel and print the raw response",
    after_help = "Example: webget stanford.edu /class/cs144"
)]
pub struct Cli {
    /// 目标主机名或 IP 字面量。
    pub host: String,

    /// 请求路径，原样放入请求行。
    pub path: String,

    /// 服务名（如 `http`）或十进制端口号。
    #[arg(long, env = "WEBGET_SERVICE", default_value = "http")]
    pub service: String,

    /// 通道配置文件（TOML），字段与 `ChannelConfig` 一致。
    #[arg(long, env = "WEBGET_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 建连时限（毫秒）。
    #[arg(long, env = "WEBGET_CONNECT_TIMEOUT_MS", value_name = "MS")]
    pub connect_timeout_ms: Option<u64>,

    /// 单次读取时限（毫秒），缺省不限时。
    #[arg(long, env = "WEBGET_READ_TIMEOUT_MS", value_name = "MS")]
    pub read_timeout_ms: Option<u64>,

    /// 入站暂存容量（字节）。
    #[arg(long, env = "WEBGET_RECV_CAPACITY", value_name = "BYTES")]
    pub recv_capacity: Option<usize>,
}

impl Cli {
    /// 合成最终的通道配置：先读配置文件，再叠加显式给出的选项。
    pub fn channel_config(&self) -> anyhow::Result<ChannelConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                ChannelConfig::from_toml_str(&text)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => ChannelConfig::default(),
        };
        if let Some(ms) = self.connect_timeout_ms {
            config = config.with_connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.read_timeout_ms {
            config = config.with_read_timeout(Some(Duration::from_millis(ms)));
        }
        if let Some(capacity) = self.recv_capacity {
            config = config.with_recv_capacity(capacity);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::{CommandFactory, error::ErrorKind};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn requires_exactly_two_positionals() {
        let err = Cli::try_parse_from(["webget", "example.com"]).expect_err("缺少 PATH");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["webget", "a", "/b", "extra"]).expect_err("多余参数");
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "webget",
            "example.com",
            "/",
            "--service",
            "8080",
            "--read-timeout-ms",
            "250",
            "--recv-capacity",
            "1024",
        ])
        .expect("合法参数");
        assert_eq!(cli.service, "8080");

        let config = cli.channel_config().expect("无配置文件");
        assert_eq!(config.recv_capacity, 1024);
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.connect_timeout(), ChannelConfig::default().connect_timeout());
    }

    #[test]
    fn missing_config_file_is_reported() {
        let cli = Cli::try_parse_from([
            "webget",
            "example.com",
            "/",
            "--config",
            "/nonexistent/webget.toml",
        ])
        .expect("合法参数");
        let err = cli.channel_config().expect_err("文件不存在");
        assert!(format!("{err:#}").contains("/nonexistent/webget.toml"));
    }
}
