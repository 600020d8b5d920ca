//! Store usage metrics
//!
//! Breaks down how many bytes of the device store a configuration takes, so
//! the editing layer can show remaining space before a compile fails.

use crate::config::CodecConfig;
use crate::model::Configuration;
use crate::protocol::{FORMULA_RECORD_SIZE, FUNCTION_RECORD_SIZE, HEADER_SIZE};
use crate::STORE_SIZE;

/// Byte usage of a configuration, per section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutMetrics {
    /// Fixed header (timer table, watchdog, counts)
    pub header_bytes: usize,
    /// Function records
    pub function_bytes: usize,
    /// Formula records
    pub formula_bytes: usize,
    /// Program data region
    pub program_bytes: usize,
    /// Usable store size
    pub capacity: usize,
}

impl LayoutMetrics {
    /// Measure a configuration against the store described by `config`
    ///
    /// Offsets are single bytes, so the usable capacity never exceeds
    /// [`STORE_SIZE`] whatever the configured value.
    pub fn of(configuration: &Configuration, config: &CodecConfig) -> Self {
        Self {
            header_bytes: HEADER_SIZE,
            function_bytes: configuration.functions.len() * FUNCTION_RECORD_SIZE,
            formula_bytes: configuration.formulas.len() * FORMULA_RECORD_SIZE,
            program_bytes: configuration.program_bytes(),
            capacity: config.capacity.min(STORE_SIZE),
        }
    }

    /// Total encoded size
    pub fn total(&self) -> usize {
        self.header_bytes + self.function_bytes + self.formula_bytes + self.program_bytes
    }

    /// Where the program data region starts
    pub fn program_section_start(&self) -> usize {
        self.header_bytes + self.function_bytes + self.formula_bytes
    }

    /// Check whether the configuration fits the store
    pub fn fits(&self) -> bool {
        self.total() <= self.capacity
    }

    /// Bytes left in the store (0 when over capacity)
    pub fn free_bytes(&self) -> usize {
        self.capacity.saturating_sub(self.total())
    }

    /// Store utilization in percent (may exceed 100)
    pub fn utilization_percent(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.total() as f64 / self.capacity as f64 * 100.0
    }
}
