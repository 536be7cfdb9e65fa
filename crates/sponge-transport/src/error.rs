use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::Address;

/// 描述一次底层操作对应的稳定错误码与默认文案。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationKind {
    pub code: &'static str,
    pub message: &'static str,
}

pub(crate) const RESOLVE: OperationKind = OperationKind {
    code: "sponge.transport.resolve_failed",
    message: "resolve",
};
pub(crate) const CONNECT: OperationKind = OperationKind {
    code: "sponge.transport.tcp.connect_failed",
    message: "tcp connect",
};
pub(crate) const READ: OperationKind = OperationKind {
    code: "sponge.transport.tcp.read_failed",
    message: "tcp read",
};
pub(crate) const WRITE: OperationKind = OperationKind {
    code: "sponge.transport.tcp.write_failed",
    message: "tcp write",
};
pub(crate) const SHUTDOWN: OperationKind = OperationKind {
    code: "sponge.transport.tcp.shutdown_failed",
    message: "tcp shutdown",
};

/// 传输层错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：解析、建连与读写失败都会终止一次 CLI 调用，但日志与调用方仍需要稳定的错误码
///   与分类来区分“可重试”与“配置错误”。
/// - **契约 (What)**：
///   - I/O 失败统一落在 [`TransportError::Io`]，携带操作标签与原始 `io::Error`；
///   - 解析类错误保留 `host`/`service`，便于直接打印给用户；
///   - [`code`](Self::code) 返回稳定错误码，[`category`](Self::category) 返回重试分类。
/// - **设计权衡 (Trade-offs)**：上下文以 `String` 保存，牺牲少量分配换取可读的报错文本。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// 套接字操作失败。
    #[error("{}: {source}", .kind.message)]
    Io {
        kind: OperationKind,
        #[source]
        source: io::Error,
    },

    /// 名称解析失败。
    #[error("resolve({host}, {service}): {source}")]
    Resolve {
        host: String,
        service: String,
        #[source]
        source: io::Error,
    },

    /// 解析成功但没有得到任何地址。
    #[error("resolve({host}, {service}) returned successfully but with no results")]
    NoAddress { host: String, service: String },

    /// 服务名既不是端口号，也不在已知服务表中。
    #[error("unknown service `{0}`")]
    UnknownService(String),

    /// 期望数字形式的 IP 地址，但输入无法解析。
    #[error("invalid numeric address `{0}`")]
    InvalidAddress(String),

    /// 对非 IPv4 地址请求 IPv4 数值表示。
    #[error("ipv4_numeric called on non-IPv4 address {0}")]
    NotIpv4(Address),

    /// 操作超过配置的时限。
    #[error("{} timed out after {after:?}", .kind.message)]
    Timeout {
        kind: OperationKind,
        after: Duration,
    },

    /// 写半部已关闭后仍尝试写入。
    #[error("{}: channel already closed", .kind.message)]
    Closed { kind: OperationKind },

    /// 通道配置不合法。
    #[error("invalid channel config: {0}")]
    InvalidConfig(&'static str),
}

/// 错误的重试分类，供上层决定是否退避重试。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 可在给定时长后重试。
    Retryable { after: Duration },
    /// 重试无意义，例如配置或输入错误。
    NonRetryable,
    /// 超时，是否重试由调用方的时限策略决定。
    Timeout,
}

impl TransportError {
    pub(crate) fn io(kind: OperationKind, source: io::Error) -> Self {
        Self::Io { kind, source }
    }

    /// 返回稳定错误码，适合作为日志字段或指标标签。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { kind, .. } | Self::Timeout { kind, .. } | Self::Closed { kind } => {
                kind.code
            }
            Self::Resolve { .. } | Self::NoAddress { .. } => RESOLVE.code,
            Self::UnknownService(_) => "sponge.transport.unknown_service",
            Self::InvalidAddress(_) => "sponge.transport.invalid_address",
            Self::NotIpv4(_) => "sponge.transport.not_ipv4",
            Self::InvalidConfig(_) => "sponge.transport.invalid_config",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io { source, .. } => categorize_io_error(source),
            Self::Resolve { source, .. } => categorize_io_error(source),
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::NoAddress { .. }
            | Self::UnknownService(_)
            | Self::InvalidAddress(_)
            | Self::NotIpv4(_)
            | Self::Closed { .. }
            | Self::InvalidConfig(_) => ErrorCategory::NonRetryable,
        }
    }
}

fn categorize_io_error(error: &io::Error) -> ErrorCategory {
    use io::ErrorKind;
    match error.kind() {
        ErrorKind::TimedOut => ErrorCategory::Timeout,
        ErrorKind::WouldBlock | ErrorKind::Interrupted => ErrorCategory::Retryable {
            after: Duration::from_millis(5),
        },
        ErrorKind::ConnectionRefused
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::NotConnected
        | ErrorKind::AddrInUse
        | ErrorKind::AddrNotAvailable
        | ErrorKind::BrokenPipe => ErrorCategory::Retryable {
            after: Duration::from_millis(50),
        },
        ErrorKind::WriteZero => ErrorCategory::Retryable {
            after: Duration::from_millis(10),
        },
        _ => ErrorCategory::NonRetryable,
    }
}
