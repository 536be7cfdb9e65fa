use std::io;

use sponge_transport::{ChannelConfig, TcpChannel, TransportError, resolve};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// 一次拉取失败的原因：要么来自传输层，要么是写出响应时出错。
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to write response: {0}")]
    Output(#[source] io::Error),
}

/// 构造携带 `Connection: close` 的 HTTP/1.1 GET 请求。
///
/// 空行结束头部，告知服务端请求已完整；`Connection: close` 使服务端在响应后关闭连接，
/// 从而让读取端以 `eof()` 作为唯一终止条件。
pub fn build_request(host: &str, path: &str) -> String {
    format!("GET {path} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n")
}

/// 向 `host` 的 `service` 发起请求，并把响应原样写入 `out`，返回写出的字节数。
///
/// # 契约（What）
/// - 循环读取直至通道 `eof()`，不会在第一次读取后提前返回；
/// - 结束后关闭通道；任何解析、建连或 I/O 失败都以 [`FetchError`] 返回，不做重试。
#[tracing::instrument(level = "debug", skip(config, out))]
pub async fn get_url<W>(
    host: &str,
    path: &str,
    service: &str,
    config: &ChannelConfig,
    out: &mut W,
) -> Result<u64, FetchError>
where
    W: AsyncWrite + Unpin,
{
    let addr = resolve(host, service).await?;
    let mut channel = TcpChannel::connect(&addr, config).await?;
    channel.write(build_request(host, path).as_bytes()).await?;

    let mut copied = 0u64;
    while !channel.eof() {
        let chunk = channel.read().await?;
        out.write_all(&chunk).await.map_err(FetchError::Output)?;
        copied += chunk.len() as u64;
    }
    out.flush().await.map_err(FetchError::Output)?;
    channel.close().await?;

    tracing::debug!(peer = %addr, bytes = copied, "response streamed");
    Ok(copied)
}
