//! Function and formula records
//!
//! Function record (16 bytes):
//!
//! ```text
//! [0..6)  sensor id
//! [6]     diff: offset of the function record of the diff sensor, or 0
//! [7]     flags: cooling 0x80, critical 0x40, display 0x20,
//!                formula 0x08 | input index in the low 3 bits
//! [8]     direct relay mask
//! [9..16) weekday → thermal program offset
//! ```
//!
//! Formula record (3 bytes): mask1, mask2, relays.

use crate::allocator::Allocation;
use crate::config::CodecConfig;
use crate::error::{DecodeError, EncodeError};
use crate::model::{Formula, Function, Program, ProgramId, ThermalEntry};
use crate::protocol::{
    flags, function_layout as layout, BufferOffset, SensorId, DAYS_PER_WEEK, FORMULA_RECORD_SIZE,
    FUNCTION_RECORD_SIZE, HEADER_SIZE, SENSOR_ID_SIZE,
};
use crate::weekday::{self, ProgramCache, ReferenceSet};
use std::collections::BTreeMap;

/// Offset of the `index`-th function record
pub fn function_offset(index: usize) -> usize {
    HEADER_SIZE + index * FUNCTION_RECORD_SIZE
}

/// Resolve a function's diff sensor to the offset of that sensor's record
///
/// The offset follows the final position in `functions`, so reordering
/// functions re-targets the reference.
pub fn resolve_diff(function: &Function, functions: &[Function]) -> Result<BufferOffset, EncodeError> {
    let Some(diff) = function.diff else {
        return Ok(BufferOffset::NONE);
    };

    functions
        .iter()
        .position(|f| f.sensor == diff)
        .and_then(|index| BufferOffset::from_position(function_offset(index)))
        .ok_or_else(|| EncodeError::DanglingDiffReference {
            sensor: function.sensor.to_string(),
            diff: diff.to_string(),
        })
}

/// Pack the flag byte
pub fn encode_flags(function: &Function) -> Result<u8, EncodeError> {
    let mut byte = 0;
    if function.cooling {
        byte |= flags::COOLING;
    }
    if function.critical {
        byte |= flags::CRITICAL;
    }
    if function.display {
        byte |= flags::DISPLAY;
    }
    if let Some(index) = function.formula_index {
        if index > flags::FORMULA_INDEX_MASK {
            return Err(EncodeError::InvalidFormulaIndex { index });
        }
        byte |= flags::FORMULA | index;
    }
    Ok(byte)
}

/// Unpack the flag byte into (cooling, critical, display, formula index)
pub fn decode_flags(byte: u8) -> (bool, bool, bool, Option<u8>) {
    let formula_index = (byte & flags::FORMULA != 0).then_some(byte & flags::FORMULA_INDEX_MASK);
    (
        byte & flags::COOLING != 0,
        byte & flags::CRITICAL != 0,
        byte & flags::DISPLAY != 0,
        formula_index,
    )
}

/// Encode one function record
pub fn encode_function(
    function: &Function,
    functions: &[Function],
    programs: &BTreeMap<ProgramId, Program<ThermalEntry>>,
    allocation: &Allocation,
    references: &mut ReferenceSet,
) -> Result<[u8; FUNCTION_RECORD_SIZE], EncodeError> {
    let mut record = [0u8; FUNCTION_RECORD_SIZE];

    record[layout::SENSOR..layout::SENSOR + SENSOR_ID_SIZE]
        .copy_from_slice(function.sensor.as_bytes());
    record[layout::DIFF] = resolve_diff(function, functions)?.to_byte();
    record[layout::FLAGS] = encode_flags(function)?;
    record[layout::RELAYS] = function.relays;

    let table = weekday::encode_table(&function.programs, programs, allocation, references)?;
    record[layout::PROGRAMS..layout::PROGRAMS + DAYS_PER_WEEK].copy_from_slice(&table);

    Ok(record)
}

/// Decode the function record at `position`
///
/// Thermal programs referenced by the record are decoded into `cache`.
pub fn decode_function(
    buffer: &[u8],
    position: usize,
    cache: &mut ProgramCache<ThermalEntry>,
    config: &CodecConfig,
) -> Result<Function, DecodeError> {
    let end = position + FUNCTION_RECORD_SIZE;
    let record = buffer.get(position..end).ok_or(DecodeError::BufferTooShort {
        needed: end,
        available: buffer.len(),
    })?;

    let sensor = read_sensor(buffer, position + layout::SENSOR)?;

    // The diff byte points at another record's header; only its sensor is read
    let diff_offset = BufferOffset::from_byte(record[layout::DIFF]);
    let diff = if diff_offset.is_none() {
        None
    } else {
        Some(read_sensor(buffer, diff_offset.position())?)
    };

    let (cooling, critical, display, formula_index) = decode_flags(record[layout::FLAGS]);
    let relays = record[layout::RELAYS];
    let programs = weekday::decode_table(buffer, position + layout::PROGRAMS, cache, config)?;

    Ok(Function {
        sensor,
        diff,
        cooling,
        critical,
        display,
        formula_index,
        relays,
        programs,
    })
}

fn read_sensor(buffer: &[u8], position: usize) -> Result<SensorId, DecodeError> {
    let end = position + SENSOR_ID_SIZE;
    let bytes: [u8; SENSOR_ID_SIZE] = buffer
        .get(position..end)
        .and_then(|b| b.try_into().ok())
        .ok_or(DecodeError::BufferTooShort {
            needed: end,
            available: buffer.len(),
        })?;
    Ok(SensorId::new(bytes))
}

/// Encode one formula record
pub fn encode_formula(formula: &Formula) -> [u8; FORMULA_RECORD_SIZE] {
    [formula.mask1, formula.mask2, formula.relays]
}

/// Decode the formula record at `position`
pub fn decode_formula(buffer: &[u8], position: usize) -> Result<Formula, DecodeError> {
    match buffer.get(position..position + FORMULA_RECORD_SIZE) {
        Some(&[mask1, mask2, relays]) => Ok(Formula {
            mask1,
            mask2,
            relays,
        }),
        _ => Err(DecodeError::BufferTooShort {
            needed: position + FORMULA_RECORD_SIZE,
            available: buffer.len(),
        }),
    }
}
