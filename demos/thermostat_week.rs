//! Weekly thermostat program example
//!
//! Builds a two-zone heating configuration with a lighting timer, compiles
//! it, dumps the blob and decompiles it again.
//!
//! Run with: `cargo run --example thermostat_week`

use termos::{
    compile, decompile, Configuration, Formula, Function, LayoutMetrics, CodecConfig,
    ThermalEntry, TimerEntry, WeekdayTable,
};

fn main() {
    println!("=== Termos Weekly Program Example ===\n");

    let mut config = Configuration::new();
    config.watchdog_relays = 0x01;

    // Heating programs: workdays and weekend
    config.thermal_programs.insert(
        "workday".into(),
        vec![
            ThermalEntry::new(6, 0, 21.0, 0.5),
            ThermalEntry::new(8, 0, 18.0, 0.5),
            ThermalEntry::new(16, 30, 21.0, 0.5),
            ThermalEntry::new(22, 0, 17.5, 0.5),
        ]
        .into(),
    );
    config.thermal_programs.insert(
        "weekend".into(),
        vec![
            ThermalEntry::new(8, 0, 21.5, 0.5),
            ThermalEntry::new(23, 0, 17.5, 0.5),
        ]
        .into(),
    );

    let mut living_room = Function::new("28FF4A1B0301".parse().expect("valid sensor id"));
    living_room.display = true;
    living_room.relays = 0x01;
    living_room.programs = WeekdayTable::every_day("workday");
    living_room.programs.set(5, Some("weekend"));
    living_room.programs.set(6, Some("weekend"));

    // Floor heating follows the living room sensor, feeding formula input 0
    let mut floor = Function::new("28FF4A1B0302".parse().expect("valid sensor id"));
    floor.diff = Some(living_room.sensor);
    floor.formula_index = Some(0);
    floor.programs = WeekdayTable::every_day("workday");

    config.functions.push(living_room);
    config.functions.push(floor);
    config.formulas.push(Formula {
        mask1: 0x01,
        mask2: 0x00,
        relays: 0x02,
    });

    // Garden lights every evening
    config.timer = WeekdayTable::every_day("lights");
    config.timer_programs.insert(
        "lights".into(),
        vec![
            TimerEntry::new(18, 0, 0x04, 0x00, 0x00),
            TimerEntry::new(23, 30, 0x00, 0x04, 0x00),
        ]
        .into(),
    );

    let metrics = LayoutMetrics::of(&config, &CodecConfig::default());
    println!(
        "Layout: header {} + functions {} + formulas {} + programs {} = {} bytes ({:.1}% of store)",
        metrics.header_bytes,
        metrics.function_bytes,
        metrics.formula_bytes,
        metrics.program_bytes,
        metrics.total(),
        metrics.utilization_percent()
    );

    let blob = match compile(&config) {
        Ok(blob) => blob,
        Err(e) => {
            eprintln!("Compile failed: {}", e);
            return;
        }
    };

    println!("\nBlob ({} bytes):", blob.len());
    for (i, chunk) in blob.chunks(16).enumerate() {
        let line: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        println!("  {:03}: {}", i * 16, line.join(" "));
    }

    let restored = match decompile(&blob) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Decompile failed: {}", e);
            return;
        }
    };

    println!("\nDecompiled programs:");
    for (id, program) in &restored.thermal_programs {
        let entries: Vec<String> = program
            .iter()
            .map(|e| format!("{} {:.1}°C ±{:.1}", e.time, e.temperature, e.hysteresis))
            .collect();
        println!("  thermal {}: {}", id, entries.join(", "));
    }
    for (id, program) in &restored.timer_programs {
        let entries: Vec<String> = program
            .iter()
            .map(|e| format!("{} on {:08b} off {:08b}", e.time, e.relays_on, e.relays_off))
            .collect();
        println!("  timer {}: {}", id, entries.join(", "));
    }
}
