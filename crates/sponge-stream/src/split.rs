use core::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::{
    ByteStream,
    sync::{Arc, Mutex},
};

/// 字节流的写入半部，全程唯一。
///
/// # 教案式说明
/// - **意图 (Why)**：把“至多一个生产者”从约定提升为类型约束：该类型不实现 `Clone`，
///   只能通过移动在线程或任务之间转交。
/// - **契约 (What)**：`write` 与 [`ByteStream::write`] 语义一致，按剩余容量部分接受；
///   写入半部被丢弃时自动调用 `end_input`，消失的生产者不可能再写入。
/// - **实现 (How)**：与 [`StreamReader`] 共享 `Arc<Mutex<ByteStream>>`，每次调用只持锁完成一次
///   非阻塞操作。
pub struct StreamWriter {
    shared: Arc<Mutex<ByteStream>>,
    end_on_drop: bool,
}

/// 字节流的读取半部，全程唯一。
///
/// 所有读取操作都不会阻塞：没有数据时返回空结果，是否继续等待由 [`eof`](Self::eof) 决定。
pub struct StreamReader {
    shared: Arc<Mutex<ByteStream>>,
}

/// 试图合并来自不同字节流的读写半部时返回，原样交还两个半部。
#[derive(Debug, Error)]
#[error("tried to reunite halves that do not belong to the same byte stream")]
pub struct ReuniteError(pub StreamWriter, pub StreamReader);

impl ByteStream {
    /// 将字节流拆分为单写单读的两个半部。
    ///
    /// 拆分不会改变任何计数器或缓冲内容；需要时可用 [`StreamReader::reunite`] 还原。
    pub fn split(self) -> (StreamWriter, StreamReader) {
        let shared = Arc::new(Mutex::new(self));
        (
            StreamWriter {
                shared: Arc::clone(&shared),
                end_on_drop: true,
            },
            StreamReader { shared },
        )
    }
}

impl StreamWriter {
    /// 写入 `data` 的前缀，返回实际接受的字节数。
    pub fn write(&mut self, data: &[u8]) -> usize {
        self.shared.lock().write(data)
    }

    /// 声明不会再有写入；之后不应再调用 [`write`](Self::write)。
    pub fn end_input(&mut self) {
        self.shared.lock().end_input();
    }

    pub fn input_ended(&self) -> bool {
        self.shared.lock().input_ended()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.shared.lock().remaining_capacity()
    }

    pub fn bytes_written(&self) -> u64 {
        self.shared.lock().bytes_written()
    }
}

impl Drop for StreamWriter {
    fn drop(&mut self) {
        if self.end_on_drop {
            self.shared.lock().end_input();
        }
    }
}

impl StreamReader {
    pub fn peek(&self, len: usize) -> Bytes {
        self.shared.lock().peek(len)
    }

    pub fn pop(&mut self, len: usize) {
        self.shared.lock().pop(len);
    }

    /// 读取并弹出至多 `len` 个字节；`peek` 与 `pop` 在同一次持锁内完成。
    pub fn read(&mut self, len: usize) -> Bytes {
        self.shared.lock().read(len)
    }

    pub fn buffer_size(&self) -> usize {
        self.shared.lock().buffer_size()
    }

    pub fn buffer_empty(&self) -> bool {
        self.shared.lock().buffer_empty()
    }

    pub fn eof(&self) -> bool {
        self.shared.lock().eof()
    }

    pub fn bytes_read(&self) -> u64 {
        self.shared.lock().bytes_read()
    }

    /// 用配对的写入半部还原出独占的 [`ByteStream`]。
    ///
    /// - 成功时缓冲内容、计数器与结束标记原样保留，写入半部不会触发 `end_input`；
    /// - 两个半部不属于同一次 [`ByteStream::split`] 时返回 [`ReuniteError`]。
    pub fn reunite(self, mut writer: StreamWriter) -> Result<ByteStream, ReuniteError> {
        if !Arc::ptr_eq(&self.shared, &writer.shared) {
            return Err(ReuniteError(writer, self));
        }
        writer.end_on_drop = false;
        drop(writer);
        match Arc::try_unwrap(self.shared) {
            Ok(mutex) => Ok(mutex.into_inner()),
            // 仅剩本半部持有引用；保留分支以免依赖 `Arc` 计数的时序。
            Err(shared) => Ok(shared.lock().clone()),
        }
    }
}

impl fmt::Debug for StreamWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamWriter")
            .field("stream", &*self.shared.lock())
            .finish()
    }
}

impl fmt::Debug for StreamReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamReader")
            .field("stream", &*self.shared.lock())
            .finish()
    }
}
