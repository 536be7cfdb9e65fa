//! `sponge-stream` 提供带流量控制的有界字节流 [`ByteStream`]。
//!
//! # 模块定位（Why）
//! - 位于“协议逻辑”与“I/O 驱动”之间的进程内缓冲层：生产者（例如报文重组器）按容量写入，
//!   消费者（例如读取套接字语义流的应用）按 FIFO 顺序取出。
//! - 背压是契约的一部分：写入永远不会超出声明容量，超出部分由调用方自行保留并稍后重试。
//!
//! # 设计概要（How）
//! - `stream` 模块实现基于索引环形缓冲的 [`ByteStream`]，构造时一次性分配，弹出只移动读指针；
//! - `io` 模块为其适配 `std::io::{Read, Write}` 与 `bytes::Buf`，便于直接挂在传输通道之后；
//! - `split` 模块将单写单读约束表达为类型：[`StreamWriter`] 与 [`StreamReader`] 均不可克隆，
//!   可分别移交给不同线程或任务。
//!
//! # 契约摘要（What）
//! - `buffer_size() <= capacity()` 恒成立，由写路径保证；
//! - `bytes_written() - bytes_read() == buffer_size()`；
//! - `eof()` 当且仅当 `input_ended() && buffer_empty()`，一旦成立不再回退。

mod io;
mod split;
mod stream;
mod sync;

pub use split::{ReuniteError, StreamReader, StreamWriter};
pub use stream::ByteStream;
