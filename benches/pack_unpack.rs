use bitsignal::{
    buffer::BitBuffer,
    layout::{DynSignal, SignalLayout, Value, ValueKind},
    signal::FixedWidthSignal,
};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const FRAME_SIZE: usize = 64;

fn gen_layouts(signal_count: usize) -> Vec<SignalLayout> {
    let mut layouts = Vec::with_capacity(signal_count);

    // 13-bit fields back to back, so most of them straddle byte boundaries
    for i in 0..signal_count {
        layouts.push(SignalLayout::new(ValueKind::U16, 4 + i * 13).with_bit_size(13));
    }

    layouts
}

fn bench_fixed_width(c: &mut Criterion) {
    c.bench_function("fixed_insert_extract_u16_12", |b| {
        let speed = FixedWidthSignal::<u16, 4, 12>::with_value(0xABC);
        let mut decoded = FixedWidthSignal::<u16, 4, 12>::new();
        let mut frame = BitBuffer::<FRAME_SIZE>::new();

        b.iter(|| {
            frame.clear();
            frame.insert(black_box(&speed));
            decoded.clear();
            frame.extract(&mut decoded);
            black_box(decoded.read())
        })
    });

    c.bench_function("fixed_insert_extract_f64_unaligned", |b| {
        let position = FixedWidthSignal::<f64, 19>::with_value(48.137154);
        let mut decoded = FixedWidthSignal::<f64, 19>::new();
        let mut frame = BitBuffer::<FRAME_SIZE>::new();

        b.iter(|| {
            frame.clear();
            frame.insert(black_box(&position));
            decoded.clear();
            frame.extract(&mut decoded);
            black_box(decoded.read())
        })
    });
}

fn bench_dyn_frame(c: &mut Criterion) {
    for &signal_count in &[1usize, 10, 30] {
        let mut signals: Vec<DynSignal> = gen_layouts(signal_count)
            .into_iter()
            .map(|layout| DynSignal::new(layout).unwrap())
            .collect();

        for (i, signal) in signals.iter_mut().enumerate() {
            signal.write(Value::U16((i * 311 % 8192) as u16)).unwrap();
        }

        let mut frame = BitBuffer::<FRAME_SIZE>::new();

        c.bench_function(&format!("dyn_pack_{}_signals", signal_count), |b| {
            b.iter(|| {
                frame.clear();
                for signal in &signals {
                    frame.insert(black_box(signal));
                }
            })
        });

        c.bench_function(&format!("dyn_unpack_{}_signals", signal_count), |b| {
            b.iter(|| {
                for signal in signals.iter_mut() {
                    signal.clear();
                    frame.extract(signal);
                }
            })
        });
    }
}

criterion_group!(benches, bench_fixed_width, bench_dyn_frame);
criterion_main!(benches);
