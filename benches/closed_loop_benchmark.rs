//! Benchmark for the closed-loop tick
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use core::cell::Cell;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use closed_loop_pidf::closed_loop::{ClosedLoop, ClosedLoopState, FuncClosedLoop, OutputOptions};
use closed_loop_pidf::profile::{GainProfile, GainProfileBuilder};
use closed_loop_pidf::scalar::Real;

fn make_profile<T: Real>() -> GainProfile<T> {
    GainProfileBuilder::default()
        .p(T::from_int(2))
        .i(T::from_int(1) / T::from_int(64))
        .d(T::from_int(8))
        .f(T::from_int(1) / T::from_int(4))
        .integral_zone(400)
        .closed_loop_ramp_rate(12)
        .build()
        .unwrap()
}

/// One tick has to fit comfortably in a 1 ms period on a microcontroller, so on a desktop each
/// computation should take a few nanoseconds.
fn bench_func_closed_loop(c: &mut Criterion) {
    let pid = FuncClosedLoop::new(make_profile::<f64>());
    let mut state = ClosedLoopState::<f64>::new_uninit();
    state.set_target(1000.0);
    let driver = || 0;
    let mut measurement = 0;
    let mut output: f64 = 0.0;

    c.bench_function("functional closed loop", |b| {
        b.iter(|| {
            (output, state) = pid.compute(
                state,
                black_box(measurement),
                OutputOptions::default(),
                &driver,
            );
            measurement = (measurement + 1) % 2000; // prevent constant inputs
            black_box(output);
        });
    });
}

fn bench_stateful_closed_loop(c: &mut Criterion) {
    let mut pid = ClosedLoop::new(make_profile::<f64>(), || 0);
    pid.set_target(1000.0);
    let mut measurement = 0;

    c.bench_function("stateful closed loop", |b| {
        b.iter(|| {
            let output = pid.compute(black_box(measurement), OutputOptions::new(false, true));
            measurement = (measurement + 1) % 2000;
            black_box(output);
        });
    });
}

/// Single precision is what most motor-controller FPUs offer.
fn bench_stateful_closed_loop_f32(c: &mut Criterion) {
    let mut pid = ClosedLoop::new(make_profile::<f32>(), || 0);
    pid.set_target(1000.0);
    let mut measurement = 0;

    c.bench_function("stateful closed loop (f32)", |b| {
        b.iter(|| {
            let output = pid.compute(black_box(measurement), OutputOptions::default());
            measurement = (measurement + 1) % 2000;
            black_box(output);
        });
    });
}

/// Switching profiles through a closure, as a gear change would.
fn bench_selected_profile(c: &mut Criterion) {
    let slots = [make_profile::<f64>(), GainProfile::default()];
    let tick = Cell::new(0usize);
    let mut measurement = 0;

    let pid = FuncClosedLoop::new(|| slots[(tick.get() >> 10) & 1]);
    let mut state = ClosedLoopState::<f64>::new_uninit();
    state.set_target(1000.0);
    let driver = || 0;

    c.bench_function("selected profile closed loop", |b| {
        b.iter(|| {
            let output;
            (output, state) = pid.compute(
                state,
                black_box(measurement),
                OutputOptions::default(),
                &driver,
            );
            measurement = (measurement + 1) % 2000;
            tick.set(tick.get().wrapping_add(1));
            black_box(output);
        });
    });
}

criterion_group!(
    benches,
    bench_func_closed_loop,
    bench_stateful_closed_loop,
    bench_stateful_closed_loop_f32,
    bench_selected_profile,
);
criterion_main!(benches);
