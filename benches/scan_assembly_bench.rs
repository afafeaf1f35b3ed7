//! Benchmarks for the per-byte scan path.
//!
//! Every byte read from the device goes through `classify()` and, when
//! printable, into a `ScanBuffer`. These benchmarks measure those two
//! building blocks only. The controller's own loop also takes the scan lock
//! and rearms the inactivity timer per byte; that cost is not included.
//!
//! ```sh
//! cargo bench --bench scan_assembly_bench
//! cargo bench --bench scan_assembly_bench -- classify
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use wedge_reader::{ByteClass, ScanBuffer, classify};

/// Drive `classify` and `ScanBuffer` over `input`, returning the completed
/// barcodes.
fn assemble(input: &[u8]) -> Vec<String> {
    let mut buffer = ScanBuffer::new();
    let mut scans = Vec::new();

    for &byte in input {
        match classify(byte) {
            ByteClass::Printable => buffer.append(char::from(byte)),
            ByteClass::Terminator => {
                let barcode = buffer.flush_and_clear();
                if !barcode.is_empty() {
                    scans.push(barcode);
                }
            }
            ByteClass::Ignorable => {}
        }
    }

    scans
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let all_bytes: Vec<u8> = (0..=u8::MAX).collect();
    group.throughput(Throughput::Bytes(all_bytes.len() as u64));

    group.bench_function("all_byte_values", |b| {
        b.iter(|| {
            for &byte in &all_bytes {
                black_box(classify(black_box(byte)));
            }
        });
    });

    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");

    let cases = vec![
        ("ean13", b"4006381333931\r".repeat(1)),
        ("code128_batch", b"ITEM-00042-LOT-7\r".repeat(64)),
        // A HID report stream padded with NULs between keystrokes.
        ("noisy", b"\x00A\x00B\x00C\x001\x002\x003\x00\r".repeat(64)),
        ("no_terminator", b"X".repeat(26)),
    ];

    for (name, input) in cases {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, input| {
            b.iter(|| black_box(assemble(black_box(input))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_assemble);
criterion_main!(benches);
