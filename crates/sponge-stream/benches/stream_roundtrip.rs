use criterion::{Criterion, black_box};
use sponge_stream::ByteStream;
use std::{env, time::Duration};

/// 基准：衡量环形字节流“部分写入 -> 读取”往返的成本。
///
/// # 设计背景（Why）
/// - 弹出只推进读指针是环形实现相对“前缀删除”方案的核心收益，需要基准防止回归；
/// - 写入块大于容量的一半，使读写指针频繁跨越环尾，覆盖两段复制路径。
fn bench_stream_roundtrip(c: &mut Criterion) {
    let payload = vec![0xA5u8; 1500];
    c.bench_function("stream_roundtrip_wrapping", |b| {
        let mut stream = ByteStream::new(4096);
        // 常驻一段未读字节，读指针因此不会在每轮清空后回到环首。
        stream.write(&[0u8; 1000]);
        b.iter(|| {
            let accepted = stream.write(black_box(&payload));
            black_box(stream.read(accepted))
        });
    });

    c.bench_function("stream_read_into_small_chunks", |b| {
        let mut stream = ByteStream::new(64 * 1024);
        let mut sink = [0u8; 256];
        b.iter(|| {
            stream.write(black_box(&payload));
            while !stream.buffer_empty() {
                black_box(stream.read_into(&mut sink));
            }
        });
    });
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_stream_roundtrip(&mut criterion);
    criterion.final_summary();
}
