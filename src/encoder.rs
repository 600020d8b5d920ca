//! Encoder module
//!
//! Compiles an editable [`Configuration`] into the packed program blob
//! stored on the controller.

use crate::allocator::Allocation;
use crate::config::CodecConfig;
use crate::error::{EncodeError, Result};
use crate::function::{encode_formula, encode_function, function_offset};
use crate::metrics::LayoutMetrics;
use crate::model::Configuration;
use crate::protocol::{
    encode_counts, BufferOffset, COUNTS_OFFSET, DAYS_PER_WEEK, FORMULA_RECORD_SIZE,
    FUNCTION_RECORD_SIZE, MAX_RECORDS, TIMER_TABLE_OFFSET, WATCHDOG_OFFSET,
};
use crate::schedule::encode_program;
use crate::weekday::{encode_table, ReferenceSet};

/// Compiler for thermostat program blobs
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CodecConfig,
}

impl Compiler {
    /// Create a compiler with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compiler with custom settings
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Current settings
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compile a configuration into a program blob
    ///
    /// The blob is exactly as long as the encoded content. Nothing is
    /// returned on failure.
    pub fn compile(&self, configuration: &Configuration) -> Result<Vec<u8>> {
        let result = self.compile_inner(configuration);
        #[cfg(feature = "logging")]
        match &result {
            Ok(buffer) => log::debug!(
                "compiled {} functions, {} formulas into {} bytes",
                configuration.functions.len(),
                configuration.formulas.len(),
                buffer.len()
            ),
            Err(e) => log::warn!("compile rejected: {}", e),
        }
        result.map_err(Into::into)
    }

    fn compile_inner(
        &self,
        configuration: &Configuration,
    ) -> std::result::Result<Vec<u8>, EncodeError> {
        let function_count = configuration.functions.len();
        let formula_count = configuration.formulas.len();

        if function_count > MAX_RECORDS {
            return Err(EncodeError::TooManyFunctions {
                count: function_count,
                max: MAX_RECORDS,
            });
        }
        if formula_count > MAX_RECORDS {
            return Err(EncodeError::TooManyFormulas {
                count: formula_count,
                max: MAX_RECORDS,
            });
        }

        let layout = LayoutMetrics::of(configuration, &self.config);
        if !layout.fits() {
            return Err(EncodeError::ConfigurationTooLarge {
                size: layout.total(),
                max: layout.capacity,
            });
        }

        check_program_ids(configuration)?;

        let thermal = &configuration.thermal_programs;
        let timer = &configuration.timer_programs;

        let allocation = Allocation::new(
            thermal
                .iter()
                .map(|(id, p)| (id.as_str(), p.len()))
                .chain(timer.iter().map(|(id, p)| (id.as_str(), p.len()))),
            layout.program_section_start(),
        );

        let mut buffer = vec![0u8; layout.total()];
        let mut references = ReferenceSet::new();

        // === HEADER ===
        let table = encode_table(&configuration.timer, timer, &allocation, &mut references)?;
        buffer[TIMER_TABLE_OFFSET..TIMER_TABLE_OFFSET + DAYS_PER_WEEK].copy_from_slice(&table);
        buffer[WATCHDOG_OFFSET] = configuration.watchdog_relays;
        buffer[COUNTS_OFFSET] = encode_counts(function_count, formula_count);

        // === FUNCTIONS ===
        for (i, function) in configuration.functions.iter().enumerate() {
            let record = encode_function(
                function,
                &configuration.functions,
                thermal,
                &allocation,
                &mut references,
            )?;
            let at = function_offset(i);
            buffer[at..at + FUNCTION_RECORD_SIZE].copy_from_slice(&record);
        }

        // === FORMULAS ===
        let mut cursor = function_offset(function_count);
        for formula in &configuration.formulas {
            buffer[cursor..cursor + FORMULA_RECORD_SIZE].copy_from_slice(&encode_formula(formula));
            cursor += FORMULA_RECORD_SIZE;
        }

        // === PROGRAMS ===
        for (id, offset) in allocation.iter() {
            if !references.contains(id) {
                return Err(EncodeError::OrphanProgram { id: id.to_string() });
            }
            write_program(&mut buffer, configuration, id, offset)?;
        }

        Ok(buffer)
    }
}

/// Reject program ids that cannot be laid out unambiguously
fn check_program_ids(configuration: &Configuration) -> std::result::Result<(), EncodeError> {
    for (id, program) in &configuration.thermal_programs {
        if configuration.timer_programs.contains_key(id) {
            return Err(EncodeError::AmbiguousProgramId { id: id.clone() });
        }
        if program.is_empty() {
            return Err(EncodeError::EmptyProgram { id: id.clone() });
        }
    }
    for (id, program) in &configuration.timer_programs {
        if program.is_empty() {
            return Err(EncodeError::EmptyProgram { id: id.clone() });
        }
    }
    Ok(())
}

fn write_program(
    buffer: &mut [u8],
    configuration: &Configuration,
    id: &str,
    offset: BufferOffset,
) -> std::result::Result<(), EncodeError> {
    if let Some(program) = configuration.thermal_programs.get(id) {
        encode_program(buffer, offset, program)
    } else if let Some(program) = configuration.timer_programs.get(id) {
        encode_program(buffer, offset, program)
    } else {
        Err(EncodeError::UnknownProgram { id: id.to_string() })
    }
}
