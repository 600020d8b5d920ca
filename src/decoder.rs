//! Decoder module
//!
//! Rebuilds a [`Configuration`] from a program blob. Programs are read on
//! demand through the weekday tables, so only referenced programs come back.

use crate::config::CodecConfig;
use crate::error::{DecodeError, Result};
use crate::function::{decode_formula, decode_function};
use crate::model::{Configuration, ThermalEntry, TimerEntry};
use crate::protocol::{
    decode_counts, program_section_start, COUNTS_OFFSET, FORMULA_RECORD_SIZE,
    FUNCTION_RECORD_SIZE, HEADER_SIZE, TIMER_TABLE_OFFSET, WATCHDOG_OFFSET,
};
use crate::weekday::{decode_table, ProgramCache};

/// Decompiler for thermostat program blobs
#[derive(Debug, Clone, Default)]
pub struct Decompiler {
    config: CodecConfig,
}

impl Decompiler {
    /// Create a decompiler with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decompiler with custom settings
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Current settings
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decompile a program blob
    pub fn decompile(&self, buffer: &[u8]) -> Result<Configuration> {
        let result = self.decompile_inner(buffer);
        #[cfg(feature = "logging")]
        match &result {
            Ok(c) => log::debug!(
                "decompiled {} bytes: {} functions, {} formulas, {} thermal and {} timer programs",
                buffer.len(),
                c.functions.len(),
                c.formulas.len(),
                c.thermal_programs.len(),
                c.timer_programs.len()
            ),
            Err(e) => log::warn!("decompile failed: {}", e),
        }
        result.map_err(Into::into)
    }

    fn decompile_inner(&self, buffer: &[u8]) -> std::result::Result<Configuration, DecodeError> {
        if buffer.len() < HEADER_SIZE {
            return Err(DecodeError::BufferTooShort {
                needed: HEADER_SIZE,
                available: buffer.len(),
            });
        }

        let (function_count, formula_count) = decode_counts(buffer[COUNTS_OFFSET]);
        let fixed_len = program_section_start(function_count, formula_count);
        if buffer.len() < fixed_len {
            return Err(DecodeError::BufferTooShort {
                needed: fixed_len,
                available: buffer.len(),
            });
        }

        let mut timer_cache = ProgramCache::<TimerEntry>::new();
        let mut thermal_cache = ProgramCache::<ThermalEntry>::new();

        // === HEADER ===
        let timer = decode_table(buffer, TIMER_TABLE_OFFSET, &mut timer_cache, &self.config)?;
        let watchdog_relays = buffer[WATCHDOG_OFFSET];
        let mut cursor = HEADER_SIZE;

        // === FUNCTIONS ===
        let mut functions = Vec::with_capacity(function_count);
        for _ in 0..function_count {
            functions.push(decode_function(buffer, cursor, &mut thermal_cache, &self.config)?);
            cursor += FUNCTION_RECORD_SIZE;
        }

        // === FORMULAS ===
        let mut formulas = Vec::with_capacity(formula_count);
        for _ in 0..formula_count {
            formulas.push(decode_formula(buffer, cursor)?);
            cursor += FORMULA_RECORD_SIZE;
        }

        if cursor != fixed_len {
            return Err(DecodeError::InternalInconsistency {
                expected: fixed_len,
                actual: cursor,
            });
        }

        Ok(Configuration {
            timer,
            watchdog_relays,
            functions,
            formulas,
            thermal_programs: thermal_cache.into_programs(),
            timer_programs: timer_cache.into_programs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::model::WeekdayTable;

    #[test]
    fn test_decompile_empty() {
        let configuration = Decompiler::new().decompile(&[0u8; 9]).unwrap();
        assert_eq!(configuration, Configuration::new());
    }

    #[test]
    fn test_header_too_short() {
        let err = Decompiler::new().decompile(&[0u8; 8]).unwrap_err();
        assert_eq!(
            err,
            CodecError::Decode(DecodeError::BufferTooShort {
                needed: 9,
                available: 8
            })
        );
    }

    #[test]
    fn test_records_too_short() {
        // Declares 2 functions and 1 formula: 9 + 32 + 3 bytes needed
        let mut buffer = vec![0u8; 40];
        buffer[COUNTS_OFFSET] = 0x21;
        let err = Decompiler::new().decompile(&buffer).unwrap_err();
        assert_eq!(
            err,
            CodecError::Decode(DecodeError::BufferTooShort {
                needed: 44,
                available: 40
            })
        );
    }

    #[test]
    fn test_unreferenced_programs_are_skipped() {
        // Timer table → 9 on Monday only; a second program at 14 is never referenced
        let mut buffer = vec![9, 0, 0, 0, 0, 0, 0, 0x00, 0x00];
        buffer.extend_from_slice(&[0x88, 0x00, 0x01, 0x00, 0x00]);
        buffer.extend_from_slice(&[0x97, 0x00, 0x00, 0x01, 0x00]);

        let configuration = Decompiler::new().decompile(&buffer).unwrap();

        assert_eq!(configuration.timer.get(0), Some("009"));
        assert_eq!(configuration.timer_programs.len(), 1);
        assert!(configuration.thermal_programs.is_empty());
    }

    #[test]
    fn test_shared_program_decoded_once() {
        let mut buffer = vec![9; 7];
        buffer.extend_from_slice(&[0x00, 0x00]);
        buffer.extend_from_slice(&[0x06, 0x00, 0x92, 0x00, 1, 0, 0, 0, 1, 0]);

        let configuration = Decompiler::new().decompile(&buffer).unwrap();

        assert_eq!(configuration.timer, WeekdayTable::every_day("009"));
        assert_eq!(configuration.timer_programs["009"].len(), 2);
    }

    #[test]
    fn test_invalid_bcd_in_program() {
        let mut buffer = vec![9, 0, 0, 0, 0, 0, 0, 0x00, 0x00];
        buffer.extend_from_slice(&[0x8F, 0x00, 0x01, 0x00, 0x00]);

        let err = Decompiler::new().decompile(&buffer).unwrap_err();
        assert_eq!(
            err,
            CodecError::Decode(DecodeError::InvalidBcdDigit { byte: 0x0F })
        );
    }
}
