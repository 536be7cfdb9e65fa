use tracing_subscriber::{EnvFilter, fmt};

/// 未设置 `RUST_LOG` 时使用的过滤指令。
pub const DEFAULT_FILTER: &str = "warn";

/// 构造日志过滤器：优先读取 `RUST_LOG`，缺失或非法时回落到 [`DEFAULT_FILTER`]。
pub fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 安装写往标准错误的 `fmt` 订阅器。
///
/// 标准输出专用于响应字节，日志绝不能混入其中。重复安装（例如测试中）会被静默忽略。
pub fn init() {
    let _ = fmt()
        .with_env_filter(build_env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
