#![doc = r#"
# sponge-transport

## 设计动机（Why）
- **定位**：为 `webget` 这类外围程序提供两块协作能力：把“主机名 + 服务名”解析为端点，
  以及在 Tokio 上打开一个字节通道。
- **架构角色**：入站方向以 [`sponge_stream::ByteStream`] 作为暂存区，通道的 `eof()` 直接复用
  字节流的终止条件；字节流本身保持无 I/O、无阻塞。

## 核心契约（What）
- [`resolve`]/[`Address::resolve`]：解析失败返回 [`TransportError`]，成功时至少得到一个端点；
- [`TcpChannel`]：`connect`/`write`/`read`/`eof`/`close`，读写失败映射为带稳定错误码的
  [`TransportError`]；
- [`ChannelConfig`]：暂存容量与时限，可由 TOML 加载。

## 实现策略（How）
- 解析交给 `tokio::net::lookup_host`，服务名先在内置表中换算为端口；
- 时限通过 `tokio::time::timeout` 施加在建连与单次读取上；
- 读半部关闭依赖 `socket2`，写半部关闭使用 Tokio 的 `shutdown`。

## 风险与考量（Trade-offs）
- 服务名表只覆盖常见条目，其余服务需以端口号形式给出；
- 解析结果按 IPv4 优先排序，调用方若偏好 IPv6 需自行挑选。
"#]

mod addr;
mod channel;
mod config;
mod error;

pub use addr::{Address, resolve};
pub use channel::{ShutdownDirection, TcpChannel};
pub use config::{ChannelConfig, ConfigError, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_RECV_CAPACITY};
pub use error::{ErrorCategory, OperationKind, TransportError};
