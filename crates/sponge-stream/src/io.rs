//! 标准 I/O 与 `bytes` 生态的适配层。
//!
//! `std::io` 以 `Ok(0)` 表示读端结束、以 `WriteZero` 表示写端无法前进，
//! 与字节流“空结果即稍后再试”的语义不同，因此这里把背压映射为 `WouldBlock`：
//! - `Read`：缓冲为空但输入未结束时返回 `WouldBlock`；`eof()` 成立后返回 `Ok(0)`；
//! - `Write`：容量耗尽时返回 `WouldBlock`；输入已结束时返回 `BrokenPipe`。

use std::io;

use bytes::Buf;

use crate::ByteStream;

impl io::Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.eof() {
            return Ok(0);
        }
        if self.buffer_empty() {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        Ok(self.read_into(buf))
    }
}

impl io::Write for ByteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.input_ended() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "byte stream input already ended",
            ));
        }
        if buf.is_empty() {
            return Ok(0);
        }
        match ByteStream::write(self, buf) {
            0 => Err(io::ErrorKind::WouldBlock.into()),
            accepted => Ok(accepted),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 以 `Buf` 视角暴露可读字节，`advance` 等价于 [`ByteStream::pop`]。
impl Buf for ByteStream {
    fn remaining(&self) -> usize {
        self.buffer_size()
    }

    fn chunk(&self) -> &[u8] {
        self.peek_slices(usize::MAX).0
    }

    fn chunks_vectored<'a>(&'a self, dst: &mut [io::IoSlice<'a>]) -> usize {
        let (front, back) = self.peek_slices(usize::MAX);
        let mut filled = 0;
        for segment in [front, back] {
            if segment.is_empty() || filled == dst.len() {
                break;
            }
            dst[filled] = io::IoSlice::new(segment);
            filled += 1;
        }
        filled
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.buffer_size(),
            "cannot advance past the buffered bytes: {cnt} > {}",
            self.buffer_size()
        );
        self.pop(cnt);
    }
}
