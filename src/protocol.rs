//! Wire layout of the thermostat program store
//!
//! ```text
//! ┌────────┬──────┬──────────────────────────────────────────────┐
//! │ Offset │ Size │ Content                                      │
//! ├────────┼──────┼──────────────────────────────────────────────┤
//! │ 0      │ 7    │ weekday → timer program offset (0 = none)    │
//! │ 7      │ 1    │ watchdog relay mask                          │
//! │ 8      │ 1    │ (function count << 4) | formula count        │
//! │ 9      │ 16×F │ function records                             │
//! │ 9+16F  │ 3×M  │ formula records                              │
//! │ 9+16F+3M │ …  │ program data region (allocator order)        │
//! └────────┴──────┴──────────────────────────────────────────────┘
//! ```
//!
//! Every offset stored inside the blob (weekday slots, diff references) is an
//! absolute position in the same blob and is modeled as [`BufferOffset`].

use crate::error::EncodeError;
use std::fmt;
use std::str::FromStr;

/// Number of slots in a weekday table
pub const DAYS_PER_WEEK: usize = 7;

/// Offset of the top-level timer weekday table
pub const TIMER_TABLE_OFFSET: usize = 0;

/// Offset of the watchdog relay mask
pub const WATCHDOG_OFFSET: usize = 7;

/// Offset of the packed function/formula count byte
pub const COUNTS_OFFSET: usize = 8;

/// Size of the fixed header, also where the function section starts
pub const HEADER_SIZE: usize = 9;

/// Size of one function record
pub const FUNCTION_RECORD_SIZE: usize = 16;

/// Size of one formula record
pub const FORMULA_RECORD_SIZE: usize = 3;

/// Maximum number of functions or formulas (4-bit count fields)
pub const MAX_RECORDS: usize = 15;

/// Size of a time-range entry (BCD hour, BCD minute)
pub const TIME_RANGE_ENTRY_SIZE: usize = 2;

/// Size of a program data entry
pub const DATA_ENTRY_SIZE: usize = 3;

/// Bytes used by one program entry across both sub-arrays
pub const PROGRAM_ENTRY_SIZE: usize = TIME_RANGE_ENTRY_SIZE + DATA_ENTRY_SIZE;

/// Terminator flag on the hour byte of a program's last time-range entry
pub const LAST_ENTRY_FLAG: u8 = 0x80;

/// Size of a raw sensor id
pub const SENSOR_ID_SIZE: usize = 6;

/// Function record field offsets
pub mod function_layout {
    pub const SENSOR: usize = 0;
    pub const DIFF: usize = 6;
    pub const FLAGS: usize = 7;
    pub const RELAYS: usize = 8;
    pub const PROGRAMS: usize = 9;
}

/// Function record flag bits
pub mod flags {
    pub const COOLING: u8 = 0x80;
    pub const CRITICAL: u8 = 0x40;
    pub const DISPLAY: u8 = 0x20;
    pub const FORMULA: u8 = 0x08;
    /// Formula input index, meaningful only with [`FORMULA`] set
    pub const FORMULA_INDEX_MASK: u8 = 0x07;
}

/// Start of the program data region for the given record counts
pub fn program_section_start(functions: usize, formulas: usize) -> usize {
    HEADER_SIZE + FUNCTION_RECORD_SIZE * functions + FORMULA_RECORD_SIZE * formulas
}

/// Pack the function and formula counts into the header byte
pub fn encode_counts(functions: usize, formulas: usize) -> u8 {
    ((functions as u8 & 0x0F) << 4) | (formulas as u8 & 0x0F)
}

/// Unpack the header count byte into (functions, formulas)
pub fn decode_counts(byte: u8) -> (usize, usize) {
    ((byte >> 4) as usize, (byte & 0x0F) as usize)
}

/// Absolute byte position inside a program blob
///
/// Zero is reserved for "no reference": nothing referenceable ever starts
/// inside the fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BufferOffset(u8);

impl BufferOffset {
    /// The "no reference" offset
    pub const NONE: Self = Self(0);

    /// Wrap a raw stored byte
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// Convert an absolute position, if it is addressable by one byte
    pub fn from_position(position: usize) -> Option<Self> {
        u8::try_from(position).ok().map(Self)
    }

    /// Raw byte as stored in the blob
    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// Absolute position for indexing
    pub const fn position(self) -> usize {
        self.0 as usize
    }

    /// Check whether this is the "no reference" offset
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BufferOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Raw 6-byte sensor id, written as 12 hex characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SensorId([u8; SENSOR_ID_SIZE]);

impl SensorId {
    /// Create from raw bytes
    pub const fn new(bytes: [u8; SENSOR_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub const fn as_bytes(&self) -> &[u8; SENSOR_ID_SIZE] {
        &self.0
    }
}

impl FromStr for SensorId {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EncodeError::InvalidSensorId {
            value: s.to_string(),
        };
        if s.len() != SENSOR_ID_SIZE * 2 {
            return Err(invalid());
        }
        let mut bytes = [0u8; SENSOR_ID_SIZE];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| invalid())?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for SensorId {
    type Error = EncodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SensorId> for String {
    fn from(id: SensorId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SensorId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SensorId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
