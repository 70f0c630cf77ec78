//! Command path benchmarks — parse, dispatch and the per-cycle update.
//!
//! The command path shares the cycle thread with the drive step, so a
//! slow dispatch eats directly into the 1 ms cycle budget.

use criterion::{Criterion, criterion_group, criterion_main};
use romi_common::config::ControllerConfig;
use romi_control_unit::command::CommandRegistry;
use romi_control_unit::console::parse_line;
use romi_control_unit::controller::ActuatorController;
use romi_hal::drives::simulation::create_drive;
use std::hint::black_box;

fn enabled_controller() -> ActuatorController {
    let mut controller = ActuatorController::new(ControllerConfig::default(), create_drive());
    controller.setup().expect("setup");
    controller.configure().expect("configure");
    controller.calibrate().expect("calibrate");
    controller.enable().expect("enable");
    controller
}

fn bench_parse_line(c: &mut Criterion) {
    c.bench_function("parse_moveto_frame", |b| {
        b.iter(|| parse_line(black_box("m -1 -200")))
    });
}

fn bench_position_query(c: &mut Criterion) {
    let registry = CommandRegistry::with_builtin();
    let mut controller = enabled_controller();

    c.bench_function("dispatch_position_query", |b| {
        b.iter(|| {
            registry
                .dispatch(&mut controller, black_box(b'P'), &[], None)
                .into_reply()
                .render()
        })
    });
}

fn bench_moveto_dispatch(c: &mut Criterion) {
    let registry = CommandRegistry::with_builtin();
    let mut controller = enabled_controller();

    c.bench_function("dispatch_moveto", |b| {
        b.iter(|| {
            registry
                .dispatch(&mut controller, b'm', black_box(&[-1, -200]), None)
                .into_reply()
                .render()
        })
    });
}

fn bench_controller_update(c: &mut Criterion) {
    let mut controller = enabled_controller();
    controller.moveto(1.0);

    c.bench_function("controller_update", |b| {
        b.iter(|| black_box(controller.update()))
    });
}

criterion_group!(
    benches,
    bench_parse_line,
    bench_position_query,
    bench_moveto_dispatch,
    bench_controller_update
);
criterion_main!(benches);
