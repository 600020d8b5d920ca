//! Benchmarks for compile/decompile performance

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use termos::{compile, decompile, Configuration, Formula, Function, SensorId, ThermalEntry};
use termos::{TimerEntry, WeekdayTable};

/// A configuration close to a full store
fn generate_configuration() -> Configuration {
    let mut config = Configuration::new();
    config.watchdog_relays = 0x80;
    config.timer = WeekdayTable::every_day("lights");
    config.timer_programs.insert(
        "lights".into(),
        vec![
            TimerEntry::new(7, 0, 0x01, 0x00, 0x00),
            TimerEntry::new(23, 0, 0x00, 0x01, 0x00),
        ]
        .into(),
    );

    for i in 0..6u8 {
        let mut function = Function::new(SensorId::new([0x28, i, 0, 0, 0, i]));
        function.relays = 1 << i;
        function.programs = WeekdayTable::every_day(format!("room-{i}"));
        if i > 0 {
            function.diff = Some(SensorId::new([0x28, 0, 0, 0, 0, 0]));
        }
        config.functions.push(function);
        config.thermal_programs.insert(
            format!("room-{i}"),
            vec![
                ThermalEntry::new(6, 0, 21.0, 0.5),
                ThermalEntry::new(9, 0, 18.0, 0.5),
                ThermalEntry::new(17, 0, 21.5, 0.5),
                ThermalEntry::new(22, 30, 17.0, 0.5),
            ]
            .into(),
        );
    }

    config.formulas.push(Formula {
        mask1: 0x03,
        mask2: 0x00,
        relays: 0x40,
    });

    config
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let config = generate_configuration();

    group.throughput(Throughput::Bytes(config.encoded_size() as u64));

    group.bench_function("compile_full_store", |b| {
        b.iter(|| black_box(compile(black_box(&config)).unwrap()))
    });

    group.finish();
}

fn bench_decompile(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompile");
    let blob = compile(&generate_configuration()).unwrap();

    group.throughput(Throughput::Bytes(blob.len() as u64));

    group.bench_function("decompile_full_store", |b| {
        b.iter(|| black_box(decompile(black_box(&blob)).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_decompile);
criterion_main!(benches);
