//! Daily program records
//!
//! A program of N entries is stored as two back-to-back arrays:
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────┐
//! │ N × time range (2 bytes)     │ N × data (3 bytes)           │
//! │ BCD hour | 0x80 on last,     │ thermal: temp hi, lo, hyst   │
//! │ BCD minute                   │ timer:   on, off, once       │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! The decoder walks time ranges until it meets the terminator flag, which
//! fixes N, then reads the N data entries that follow.

use crate::config::CodecConfig;
use crate::error::{DecodeError, EncodeError};
use crate::fixed_point::{
    decode_bcd, decode_hysteresis, decode_temperature, encode_bcd, encode_hysteresis,
    encode_temperature,
};
use crate::model::{Program, ThermalEntry, TimeOfDay, Timed, TimerEntry};
use crate::protocol::{BufferOffset, DATA_ENTRY_SIZE, LAST_ENTRY_FLAG, TIME_RANGE_ENTRY_SIZE};

/// Program entry with a 3-byte data representation
pub trait ScheduleEntry: Timed + Sized {
    /// Data bytes of this entry
    fn encode_data(&self) -> [u8; DATA_ENTRY_SIZE];

    /// Rebuild an entry from its time and data bytes
    fn decode_data(time: TimeOfDay, data: [u8; DATA_ENTRY_SIZE], config: &CodecConfig) -> Self;
}

impl ScheduleEntry for ThermalEntry {
    fn encode_data(&self) -> [u8; DATA_ENTRY_SIZE] {
        let [hi, lo] = encode_temperature(self.temperature);
        [hi, lo, encode_hysteresis(self.hysteresis)]
    }

    fn decode_data(time: TimeOfDay, data: [u8; DATA_ENTRY_SIZE], config: &CodecConfig) -> Self {
        Self {
            time,
            temperature: decode_temperature([data[0], data[1]], config),
            hysteresis: decode_hysteresis(data[2], config),
        }
    }
}

impl ScheduleEntry for TimerEntry {
    fn encode_data(&self) -> [u8; DATA_ENTRY_SIZE] {
        [self.relays_on, self.relays_off, self.relays_once]
    }

    fn decode_data(time: TimeOfDay, data: [u8; DATA_ENTRY_SIZE], _config: &CodecConfig) -> Self {
        Self {
            time,
            relays_on: data[0],
            relays_off: data[1],
            relays_once: data[2],
        }
    }
}

/// Encode a time range; `last` sets the terminator flag
pub fn encode_time_range(time: TimeOfDay, last: bool) -> Result<[u8; 2], EncodeError> {
    time.validate()?;
    let mut hour = encode_bcd(time.hour);
    if last {
        hour |= LAST_ENTRY_FLAG;
    }
    Ok([hour, encode_bcd(time.minute)])
}

/// Decode a time range into (time, is last)
pub fn decode_time_range(bytes: [u8; 2]) -> Result<(TimeOfDay, bool), DecodeError> {
    let last = bytes[0] & LAST_ENTRY_FLAG != 0;
    let hour = decode_bcd(bytes[0] & !LAST_ENTRY_FLAG)?;
    let minute = decode_bcd(bytes[1])?;
    Ok((TimeOfDay::new(hour, minute), last))
}

/// Write a non-empty program at `offset`
///
/// `buffer` must hold `offset + program.encoded_size()` bytes; entries are
/// written in the order given.
pub fn encode_program<E: ScheduleEntry>(
    buffer: &mut [u8],
    offset: BufferOffset,
    program: &Program<E>,
) -> Result<(), EncodeError> {
    let count = program.len();
    let times_start = offset.position();
    let data_start = times_start + count * TIME_RANGE_ENTRY_SIZE;

    for (i, entry) in program.iter().enumerate() {
        let time = encode_time_range(entry.time(), i + 1 == count)?;
        let t = times_start + i * TIME_RANGE_ENTRY_SIZE;
        buffer[t..t + TIME_RANGE_ENTRY_SIZE].copy_from_slice(&time);

        let d = data_start + i * DATA_ENTRY_SIZE;
        buffer[d..d + DATA_ENTRY_SIZE].copy_from_slice(&entry.encode_data());
    }

    Ok(())
}

/// Read the program starting at `offset`
pub fn decode_program<E: ScheduleEntry>(
    buffer: &[u8],
    offset: BufferOffset,
    config: &CodecConfig,
) -> Result<Program<E>, DecodeError> {
    #[cfg(feature = "logging")]
    log::trace!("decoding program at {}", offset);

    let mut times = Vec::new();
    let mut cursor = offset.position();
    loop {
        let bytes = read_array::<TIME_RANGE_ENTRY_SIZE>(buffer, cursor)?;
        let (time, last) = decode_time_range(bytes)?;
        times.push(time);
        cursor += TIME_RANGE_ENTRY_SIZE;
        if last {
            break;
        }
    }

    let mut program = Program::new();
    for time in times {
        let data = read_array::<DATA_ENTRY_SIZE>(buffer, cursor)?;
        program.push(E::decode_data(time, data, config));
        cursor += DATA_ENTRY_SIZE;
    }

    Ok(program)
}

fn read_array<const N: usize>(buffer: &[u8], position: usize) -> Result<[u8; N], DecodeError> {
    buffer
        .get(position..position + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(DecodeError::BufferTooShort {
            needed: position + N,
            available: buffer.len(),
        })
}
