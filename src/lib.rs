//! # Termos - thermostat program codec
//!
//! Compiles an editable thermostat configuration (sensor-driven functions,
//! formulas, thermal and timer day programs) into the densely packed blob
//! kept in the controller's 256-byte persistent store, and decompiles such a
//! blob back into a configuration.
//!
//! ## Quick Start
//!
//! ```rust
//! use termos::{compile, decompile, Configuration, Function, ThermalEntry, WeekdayTable};
//!
//! let mut function = Function::new("0102030405AA".parse().unwrap());
//! function.relays = 0x01;
//! function.programs = WeekdayTable::every_day("comfort");
//!
//! let mut config = Configuration::new();
//! config.functions.push(function);
//! config
//!     .thermal_programs
//!     .insert("comfort".into(), vec![ThermalEntry::new(6, 0, 21.0, 0.5)].into());
//!
//! let blob = compile(&config).unwrap();
//! assert_eq!(blob.len(), 30);
//!
//! let restored = decompile(&blob).unwrap();
//! assert_eq!(restored.functions[0].relays, 0x01);
//! ```
//!
//! ## Modules
//!
//! - [`model`]: Editable configuration types
//! - [`encoder`]: Configuration → blob
//! - [`decoder`]: Blob → configuration
//! - [`protocol`]: Wire layout, offsets and sensor ids
//! - [`fixed_point`]: BCD and fixed-point conversions
//! - [`allocator`]: Program placement in the data region
//! - [`weekday`]: Weekday reference tables
//! - [`function`]: Function and formula records
//! - [`schedule`]: Daily program records
//! - [`metrics`]: Store usage breakdown
//!
//! ## Cargo Features
//!
//! - `logging`: emit `log` records for compile/decompile
//! - `serde`: JSON (de)serialization of the configuration types

// Modules
pub mod allocator;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod fixed_point;
pub mod function;
pub mod metrics;
pub mod model;
pub mod protocol;
pub mod schedule;
pub mod weekday;

// Re-exports for convenient access
pub use config::CodecConfig;
pub use decoder::Decompiler;
pub use encoder::Compiler;
pub use error::{CodecError, DecodeError, EncodeError, Result};
pub use metrics::LayoutMetrics;
pub use model::{
    Configuration, Formula, Function, Program, ProgramId, RelayMask, ThermalEntry, TimeOfDay,
    TimerEntry, WeekdayTable,
};
pub use protocol::{BufferOffset, SensorId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Size of the controller's persistent program store in bytes
pub const STORE_SIZE: usize = 256;

/// Compile a configuration with default settings
pub fn compile(configuration: &Configuration) -> Result<Vec<u8>> {
    Compiler::new().compile(configuration)
}

/// Decompile a program blob with default settings
pub fn decompile(buffer: &[u8]) -> Result<Configuration> {
    Decompiler::new().decompile(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_roundtrip() {
        let mut function = Function::new("0102030405AA".parse().unwrap());
        function.critical = true;
        function.relays = 0x01;
        function.programs = WeekdayTable::every_day("1");

        let mut config = Configuration::new();
        config.functions.push(function);
        config
            .thermal_programs
            .insert("1".into(), vec![ThermalEntry::new(6, 0, 21.0, 0.5)].into());

        let blob = compile(&config).unwrap();
        assert_eq!(blob.len(), 9 + 16 + 5);

        let decoded = decompile(&blob).unwrap();
        assert_eq!(decoded.functions.len(), 1);
        assert_eq!(decoded.thermal_programs["025"], config.thermal_programs["1"]);
    }
}
