//! `sponge-webget`：连接 `HOST`，请求 `PATH`，把响应的每个字节写到标准输出直至结束。
//!
//! # 设计要点（Why）
//! - 该工具是字节通道的最小端到端消费者：解析端点、建连、写出请求、循环读取直至 `eof()`；
//! - 响应不做任何 HTTP 解析，状态行与头部原样输出；
//! - 日志只写标准错误，标准输出只承载响应体，便于管道组合。
//!
//! # 模块划分（How）
//! - `cli`：命令行参数与通道配置的合成；
//! - `fetch`：请求构造与拉取循环；
//! - `telemetry`：`tracing` 订阅器初始化。

pub mod cli;
pub mod fetch;
pub mod telemetry;

pub use cli::Cli;
pub use fetch::{FetchError, build_request, get_url};
