use std::future::Future;
use std::io;
use std::net::Shutdown as StdShutdown;
use std::time::Duration;

use bytes::Bytes;
use socket2::SockRef;
use sponge_stream::ByteStream;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

use crate::{
    Address, ChannelConfig,
    error::{self, OperationKind, TransportError},
};

/// 以 [`ByteStream`] 暂存入站字节的 TCP 通道。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 为 CLI 提供 `write`/`read`/`eof`/`close` 这一最小字节通道形态，隐藏 Tokio 具体类型；
/// - 入站方向以字节流作为暂存区：套接字单次读取不超过暂存区的剩余容量，
///   对端关闭写半部时调用 `end_input`，`eof()` 因而与字节流的终止条件完全一致。
///
/// ## 逻辑 (How)
/// - `read` 在暂存区为空且输入未结束时向套接字补充一次数据，随后取出全部缓冲字节；
/// - 读到 0 字节即视为对端结束，暂存区进入“输入已结束”状态；
/// - 建连与读取按 [`ChannelConfig`] 施加时限。
///
/// ## 契约 (What)
/// - `write`：写出全部字节并返回其长度，写半部关闭后返回 [`TransportError::Closed`]；
/// - `read`：返回一段按序字节，`eof()` 成立后返回空 `Bytes`；
/// - `close`：幂等地关闭读写两个方向；关闭后已暂存的字节仍可读出。
///
/// ## 注意事项 (Trade-offs)
/// - 通道以 `&mut self` 串行化读写，不支持同一连接上的并发读写；
/// - `read` 每次只执行一次套接字读取，调用方需循环直至 `eof()`。
#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
    inbound: ByteStream,
    scratch: Box<[u8]>,
    read_timeout: Option<Duration>,
    local_addr: Address,
    peer_addr: Address,
    write_closed: bool,
    read_closed: bool,
}

/// 表示半关闭的方向。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownDirection {
    /// 关闭写半部。
    Write,
    /// 关闭读半部。
    Read,
    /// 同时关闭读写半部。
    Both,
}

impl TcpChannel {
    /// 按配置建立到 `addr` 的连接。
    #[tracing::instrument(level = "debug", skip(addr, config), fields(peer = %addr))]
    pub async fn connect(addr: &Address, config: &ChannelConfig) -> Result<Self, TransportError> {
        if config.recv_capacity == 0 {
            return Err(TransportError::InvalidConfig("recv_capacity must be non-zero"));
        }
        let stream = with_timeout(
            error::CONNECT,
            Some(config.connect_timeout()),
            TcpStream::connect(addr.socket_addr()),
        )
        .await?;
        let local = stream
            .local_addr()
            .map_err(|err| TransportError::io(error::CONNECT, err))?;
        let peer = stream
            .peer_addr()
            .map_err(|err| TransportError::io(error::CONNECT, err))?;
        tracing::debug!(local = %local, "tcp channel connected");

        Ok(Self {
            stream,
            inbound: ByteStream::new(config.recv_capacity),
            scratch: vec![0u8; config.recv_capacity].into_boxed_slice(),
            read_timeout: config.read_timeout(),
            local_addr: Address::from(local),
            peer_addr: Address::from(peer),
            write_closed: false,
            read_closed: false,
        })
    }

    /// 写出全部字节，返回写出的数量。
    pub async fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if self.write_closed {
            return Err(TransportError::Closed { kind: error::WRITE });
        }
        if data.is_empty() {
            return Ok(0);
        }
        self.stream
            .write_all(data)
            .await
            .map_err(|err| TransportError::io(error::WRITE, err))?;
        tracing::trace!(len = data.len(), "tcp channel wrote bytes");
        Ok(data.len())
    }

    /// 读取下一段按序字节；`eof()` 成立后返回空结果。
    pub async fn read(&mut self) -> Result<Bytes, TransportError> {
        if self.inbound.buffer_empty() && !self.inbound.input_ended() {
            self.fill().await?;
        }
        Ok(self.inbound.read(self.inbound.buffer_size()))
    }

    /// 对端已结束且暂存字节已全部读出。
    pub fn eof(&self) -> bool {
        self.inbound.eof()
    }

    /// 关闭读写两个方向。重复调用没有额外效果。
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.shutdown(ShutdownDirection::Both).await
    }

    /// 按方向执行半关闭；对已关闭的方向不再重复操作。
    pub async fn shutdown(&mut self, direction: ShutdownDirection) -> Result<(), TransportError> {
        let close_write = matches!(direction, ShutdownDirection::Write | ShutdownDirection::Both);
        let close_read = matches!(direction, ShutdownDirection::Read | ShutdownDirection::Both);

        if close_write && !self.write_closed {
            self.write_closed = true;
            ignore_not_connected(AsyncWriteExt::shutdown(&mut self.stream).await)?;
        }
        if close_read && !self.read_closed {
            self.read_closed = true;
            ignore_not_connected(SockRef::from(&self.stream).shutdown(StdShutdown::Read))?;
            self.inbound.end_input();
        }
        tracing::debug!(?direction, peer = %self.peer_addr, "tcp channel shut down");
        Ok(())
    }

    pub fn peer_addr(&self) -> Address {
        self.peer_addr
    }

    pub fn local_addr(&self) -> Address {
        self.local_addr
    }

    /// 迄今从套接字接收并进入暂存区的字节总数。
    pub fn bytes_received(&self) -> u64 {
        self.inbound.bytes_written()
    }

    async fn fill(&mut self) -> Result<(), TransportError> {
        let room = self.inbound.remaining_capacity().min(self.scratch.len());
        let scratch = &mut self.scratch[..room];
        let received = with_timeout(error::READ, self.read_timeout, self.stream.read(scratch)).await?;
        if received == 0 {
            tracing::debug!(
                peer = %self.peer_addr,
                total = self.inbound.bytes_written(),
                "peer closed its write half"
            );
            self.inbound.end_input();
            return Ok(());
        }
        let accepted = self.inbound.write(&self.scratch[..received]);
        debug_assert_eq!(accepted, received, "socket read exceeded staging capacity");
        Ok(())
    }
}

/// 在可选时限内执行 IO Future，并把失败映射为 [`TransportError`]。
async fn with_timeout<F, T>(
    kind: OperationKind,
    limit: Option<Duration>,
    future: F,
) -> Result<T, TransportError>
where
    F: Future<Output = io::Result<T>>,
{
    let result = match limit {
        Some(after) => tokio::time::timeout(after, future)
            .await
            .map_err(|_| TransportError::Timeout { kind, after })?,
        None => future.await,
    };
    result.map_err(|err| TransportError::io(kind, err))
}

fn ignore_not_connected(result: io::Result<()>) -> Result<(), TransportError> {
    match result {
        Err(err) if err.kind() != io::ErrorKind::NotConnected => {
            Err(TransportError::io(error::SHUTDOWN, err))
        }
        _ => Ok(()),
    }
}
