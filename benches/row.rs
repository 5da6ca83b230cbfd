use std::hint::black_box;

use archmage::SimdToken;
use criterion::{BenchmarkGroup, Criterion, Throughput, measurement::WallTime};
use rowdelta::{RleMaskBlock, SCANLINE_PIXELS};

// === SIMD tier detection ===

fn probe<T: SimdToken>() -> &'static str {
    if T::summon().is_some() {
        "available"
    } else {
        "not available"
    }
}

fn print_simd_info() {
    eprintln!("=== SIMD Tier Detection ===");
    #[cfg(target_arch = "x86_64")]
    {
        eprintln!(
            "  AVX2+FMA (x86-64-v3):    {}",
            probe::<archmage::X64V3Token>()
        );
    }
    #[cfg(target_arch = "aarch64")]
    {
        eprintln!(
            "  Arm64-v2:                {}",
            probe::<archmage::Arm64V2Token>()
        );
    }
    eprintln!("  Scalar:                  always available");
    eprintln!("  Row encoder accelerated: {}", rowdelta::accelerated());
    eprintln!("===========================");
}

// === Naive baseline ===

fn naive_encode(row: &[u32], out: &mut [u32], rle: &mut [u64; 4]) -> usize {
    *rle = [0; 4];
    let mut kept = 0;
    for i in 0..row.len() {
        let left = if i == 0 { 0 } else { row[i - 1] };
        if row[i] == left {
            rle[i / 64] |= 1 << (i % 64);
        } else {
            out[kept] = row[i];
            kept += 1;
        }
    }
    kept
}

// === Fixtures ===

const ROWS: usize = 1080;

/// `ROWS` scanlines where roughly one pixel in `run` starts a new value.
fn make_rows(run: u32) -> Vec<u32> {
    let mut state = 0x9E37_79B9u32;
    let mut value = 0;
    (0..ROWS * SCANLINE_PIXELS)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            if state % run == 0 {
                value = state;
            }
            value
        })
        .collect()
}

/// Benchmark a whole batch of rows with 3 variants: rowdelta (best tier),
/// rowdelta_scalar, naive.
fn bench_rows(group: &mut BenchmarkGroup<WallTime>, rows: &[u32]) {
    let mut out = vec![0u32; SCANLINE_PIXELS];
    let mut rle = RleMaskBlock::default();

    group.bench_function("rowdelta", |b| {
        b.iter(|| {
            let mut total = 0;
            for row in rows.chunks_exact(SCANLINE_PIXELS) {
                total += rowdelta::encode_row(black_box(row), &mut out, &mut rle).unwrap();
            }
            black_box(total)
        });
    });

    group.bench_function("rowdelta_scalar", |b| {
        b.iter(|| {
            let mut total = 0;
            for row in rows.chunks_exact(SCANLINE_PIXELS) {
                total += rowdelta::encode_row_scalar(black_box(row), &mut out, &mut rle).unwrap();
            }
            black_box(total)
        });
    });

    let mut words = [0u64; 4];
    group.bench_function("naive", |b| {
        b.iter(|| {
            let mut total = 0;
            for row in rows.chunks_exact(SCANLINE_PIXELS) {
                total += naive_encode(black_box(row), &mut out, &mut words);
            }
            black_box(total)
        });
    });
}

fn bench_encode(c: &mut Criterion) {
    rowdelta::lut::warmup();
    for (name, run) in [("flat", 64), ("mixed", 4), ("noisy", 1)] {
        let mut group = c.benchmark_group(format!("encode_row_{name}"));
        let rows = make_rows(run);
        group.throughput(Throughput::Bytes((rows.len() * 4) as u64));
        bench_rows(&mut group, &rows);
        group.finish();
    }
}

fn bench_decode(c: &mut Criterion) {
    let rows = make_rows(4);
    let mut compacted = Vec::new();
    let mut masks = Vec::new();
    let mut out = vec![0u32; SCANLINE_PIXELS];
    for row in rows.chunks_exact(SCANLINE_PIXELS) {
        let mut rle = RleMaskBlock::default();
        let kept = rowdelta::encode_row(row, &mut out, &mut rle).unwrap();
        compacted.extend_from_slice(&out[..kept]);
        masks.push(rle);
    }

    let mut group = c.benchmark_group("decode_row_mixed");
    group.throughput(Throughput::Bytes((rows.len() * 4) as u64));
    group.bench_function("rowdelta", |b| {
        b.iter(|| {
            let mut pos = 0;
            for rle in &masks {
                pos += rowdelta::decode_row(black_box(&compacted[pos..]), rle, &mut out).unwrap();
            }
            black_box(pos)
        });
    });
    group.finish();
}

// === Custom main for tier detection before criterion runs ===

fn main() {
    print_simd_info();

    let mut criterion = Criterion::default().configure_from_args();
    bench_encode(&mut criterion);
    bench_decode(&mut criterion);
    criterion.final_summary();
}
