use core::fmt;

use bytes::{Bytes, BytesMut};

/// `ByteStream` 是容量固定、单写单读的 FIFO 字节缓冲。
///
/// # 设计动机（Why）
/// - 传输协议的接收端需要一个“可被背压”的暂存区：写入方只能推入剩余容量以内的字节，
///   读取方按写入顺序消费，二者通过 [`eof`](Self::eof) 协商流的终点。
/// - “缓冲为空”与“流已结束”必须可区分：前者意味着稍后再试，后者意味着不会再有数据。
///
/// # 结构设计（How）
/// - `storage` 为构造时一次性分配的环形区域，长度即容量；
/// - `head` 指向最早未读字节，`len` 为已缓冲字节数，弹出仅推进 `head`，不搬移内存；
/// - 两个生命周期计数器只增不减，不随弹出重置。
///
/// # 契约说明（What）
/// - **写入**：[`write`](Self::write) 接受 `min(remaining_capacity, data.len())` 字节，
///   取自 `data` 的前缀，返回值即实际接受的数量；溢出部分既不缓冲也不报错。
/// - **读取**：[`peek`](Self::peek)/[`pop`](Self::pop)/[`read`](Self::read) 的长度参数一律
///   截断到当前可读字节数；空缓冲或 `len = 0` 返回空结果且不产生副作用。
/// - **前置条件**：调用 [`end_input`](Self::end_input) 之后不得再写入。debug 构建下违反该约定会
///   触发断言；release 构建下写入被拒绝（返回 0）并记录告警，从而保证 `eof()` 不会回退。
/// - **并发**：本类型不做内部同步，所有变更方法均要求 `&mut self`；跨线程协作请使用
///   [`split`](Self::split) 得到的读写半部。
#[derive(Clone)]
pub struct ByteStream {
    storage: Box<[u8]>,
    head: usize,
    len: usize,
    bytes_written: u64,
    bytes_read: u64,
    input_ended: bool,
}

impl ByteStream {
    /// 创建容量为 `capacity` 的空字节流。
    ///
    /// `capacity = 0` 合法：此时任何写入都返回 0，仅可用于传递结束信号。
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
            bytes_written: 0,
            bytes_read: 0,
            input_ended: false,
        }
    }

    /// 写入 `data` 的前缀，返回实际接受的字节数。
    ///
    /// # 逻辑解析（How）
    /// 1. 计算 `accepted = min(remaining_capacity, data.len())`；
    /// 2. 自写指针起复制，若跨越环尾则拆成两段；
    /// 3. 累加 `bytes_written`。
    ///
    /// # 契约（What）
    /// - 返回值小于 `data.len()` 表示背压生效，调用方需自行保留剩余部分；
    /// - 写满后 `buffer_size() == capacity()`；
    /// - **前置条件**：`!input_ended()`。
    pub fn write(&mut self, data: &[u8]) -> usize {
        debug_assert!(
            !self.input_ended,
            "ByteStream::write called after end_input"
        );
        if self.input_ended {
            tracing::warn!(
                offered = data.len(),
                "write after end_input refused; stream input already ended"
            );
            return 0;
        }

        let accepted = data.len().min(self.remaining_capacity());
        if accepted == 0 {
            return 0;
        }

        let capacity = self.capacity();
        let tail = (self.head + self.len) % capacity;
        let first = accepted.min(capacity - tail);
        self.storage[tail..tail + first].copy_from_slice(&data[..first]);
        let wrapped = accepted - first;
        if wrapped > 0 {
            self.storage[..wrapped].copy_from_slice(&data[first..accepted]);
        }

        self.len += accepted;
        self.bytes_written += accepted as u64;
        accepted
    }

    /// 以两段切片的形式零拷贝查看前 `min(len, buffer_size())` 个字节。
    ///
    /// 第二段仅在数据跨越环尾时非空；拼接两段即得到按序的字节。
    pub fn peek_slices(&self, len: usize) -> (&[u8], &[u8]) {
        let visible = len.min(self.len);
        if visible == 0 {
            return (&[], &[]);
        }
        let first = visible.min(self.capacity() - self.head);
        (
            &self.storage[self.head..self.head + first],
            &self.storage[..visible - first],
        )
    }

    /// 复制前 `min(len, buffer_size())` 个字节，不改变任何状态。
    pub fn peek(&self, len: usize) -> Bytes {
        let (front, back) = self.peek_slices(len);
        if front.is_empty() {
            return Bytes::new();
        }
        let mut out = BytesMut::with_capacity(front.len() + back.len());
        out.extend_from_slice(front);
        out.extend_from_slice(back);
        out.freeze()
    }

    /// 丢弃前 `min(len, buffer_size())` 个字节，并累加 `bytes_read`。
    pub fn pop(&mut self, len: usize) {
        let removed = len.min(self.len);
        if removed == 0 {
            return;
        }
        self.len -= removed;
        // 清空后回到环首，使后续写入尽量保持连续。
        self.head = if self.len == 0 {
            0
        } else {
            (self.head + removed) % self.capacity()
        };
        self.bytes_read += removed as u64;
    }

    /// 读取并弹出前 `min(len, buffer_size())` 个字节。
    ///
    /// 与 `peek(len)` 紧接 `pop(len)` 等价，返回值恰为被移除的字节。
    pub fn read(&mut self, len: usize) -> Bytes {
        let out = self.peek(len);
        self.pop(out.len());
        out
    }

    /// 将可读字节复制到 `dst` 并弹出，返回复制的数量。
    pub fn read_into(&mut self, dst: &mut [u8]) -> usize {
        let (front, back) = self.peek_slices(dst.len());
        let copied = front.len() + back.len();
        dst[..front.len()].copy_from_slice(front);
        dst[front.len()..copied].copy_from_slice(back);
        self.pop(copied);
        copied
    }

    /// 声明不会再有写入。重复调用没有额外效果。
    pub fn end_input(&mut self) {
        if !self.input_ended {
            tracing::trace!(
                buffered = self.len,
                bytes_written = self.bytes_written,
                "byte stream input ended"
            );
        }
        self.input_ended = true;
    }

    /// 写入端是否已声明结束。
    pub fn input_ended(&self) -> bool {
        self.input_ended
    }

    /// 当前缓冲的字节数。
    pub fn buffer_size(&self) -> usize {
        self.len
    }

    pub fn buffer_empty(&self) -> bool {
        self.len == 0
    }

    /// 流是否已到终点：输入已结束且缓冲已被读空。
    ///
    /// 这是消费方唯一应当轮询的终止条件；缓冲非空时恒为 `false`。
    pub fn eof(&self) -> bool {
        self.input_ended && self.len == 0
    }

    /// 生命周期内累计接受的字节数。
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// 生命周期内累计弹出的字节数。
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// 还能接受的字节数，生产者可据此决定下一次写入的大小。
    pub fn remaining_capacity(&self) -> usize {
        self.capacity() - self.len
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("capacity", &self.capacity())
            .field("buffered", &self.len)
            .field("bytes_written", &self.bytes_written)
            .field("bytes_read", &self.bytes_read)
            .field("input_ended", &self.input_ended)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflowing_write_fills_exactly_to_capacity() {
        let mut stream = ByteStream::new(5);
        assert_eq!(stream.write(b"hello world"), 5);
        assert_eq!(stream.peek(5), Bytes::from_static(b"hello"));
        assert_eq!(stream.remaining_capacity(), 0);
        assert_eq!(stream.bytes_written(), 5);
    }

    #[test]
    fn end_input_then_drain_reaches_eof() {
        let mut stream = ByteStream::new(10);
        assert_eq!(stream.write(b"abc"), 3);
        stream.end_input();
        assert!(!stream.eof(), "仍有缓冲数据时不得提前报告 eof");
        assert_eq!(stream.read(10), Bytes::from_static(b"abc"));
        assert!(stream.eof());
    }

    #[test]
    fn truncated_write_then_peek_and_pop() {
        let mut stream = ByteStream::new(4);
        assert_eq!(stream.write(b"ab"), 2);
        assert_eq!(stream.write(b"cdef"), 2);
        assert_eq!(stream.peek(10), Bytes::from_static(b"abcd"));
        assert_eq!(stream.buffer_size(), 4, "peek 不应改变状态");
        stream.pop(2);
        assert_eq!(stream.buffer_size(), 2);
        assert_eq!(stream.bytes_read(), 2);
    }

    #[test]
    fn read_on_empty_stream_is_a_no_op() {
        let mut stream = ByteStream::new(8);
        assert!(stream.read(5).is_empty());
        assert!(!stream.input_ended());
        assert_eq!(stream.bytes_read(), 0);
        assert_eq!(stream.bytes_written(), 0);
    }

    #[test]
    fn writes_wrap_around_the_ring() {
        let mut stream = ByteStream::new(4);
        stream.write(b"abc");
        stream.pop(2);
        assert_eq!(stream.write(b"defg"), 3);

        let (front, back) = stream.peek_slices(usize::MAX);
        assert_eq!(front, b"cd");
        assert_eq!(back, b"ef");
        assert_eq!(stream.read(4), Bytes::from_static(b"cdef"));
        assert!(stream.buffer_empty());
    }

    #[test]
    fn zero_capacity_accepts_nothing() {
        let mut stream = ByteStream::new(0);
        assert_eq!(stream.write(b"x"), 0);
        assert!(stream.peek(1).is_empty());
        stream.pop(1);
        stream.end_input();
        assert!(stream.eof());
    }

    #[test]
    fn read_into_copies_across_the_wrap_point() {
        let mut stream = ByteStream::new(3);
        stream.write(b"xyz");
        stream.pop(2);
        stream.write(b"12");

        let mut dst = [0u8; 8];
        assert_eq!(stream.read_into(&mut dst), 3);
        assert_eq!(&dst[..3], b"z12");
        assert_eq!(stream.bytes_read(), 5);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "write called after end_input")]
    fn write_after_end_input_is_a_contract_violation() {
        let mut stream = ByteStream::new(4);
        stream.end_input();
        stream.write(b"late");
    }

    #[tracing_test::traced_test]
    #[test]
    #[cfg(not(debug_assertions))]
    fn write_after_end_input_is_refused_in_release_builds() {
        let mut stream = ByteStream::new(4);
        stream.end_input();
        assert_eq!(stream.write(b"late"), 0);
        assert!(stream.eof());
        assert!(logs_contain("write after end_input refused"));
    }
}
