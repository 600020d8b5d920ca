//! Error types for the thermostat program codec
//!
//! Compile failures are [`EncodeError`]s, decompile failures are
//! [`DecodeError`]s. Both convert into the top-level [`CodecError`].

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Main error type for codec operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Compile error
    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// Decompile error
    #[error("Decoding error: {0}")]
    Decode(#[from] DecodeError),
}

/// Errors while compiling a configuration into a program blob
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// More functions than the 4-bit count field can hold
    #[error("Too many functions: {count} exceeds maximum {max}")]
    TooManyFunctions { count: usize, max: usize },

    /// More formulas than the 4-bit count field can hold
    #[error("Too many formulas: {count} exceeds maximum {max}")]
    TooManyFormulas { count: usize, max: usize },

    /// Encoded size exceeds the device store
    #[error("Configuration too large: {size} bytes exceeds maximum {max}")]
    ConfigurationTooLarge { size: usize, max: usize },

    /// A stored program is never referenced from a weekday table
    #[error("Orphan program: '{id}' is not referenced by any weekday table")]
    OrphanProgram { id: String },

    /// A weekday slot references a program missing from its map
    #[error("Unknown program: '{id}' is referenced but not defined")]
    UnknownProgram { id: String },

    /// The same id is used in both the thermal and the timer program maps
    #[error("Ambiguous program id: '{id}' is defined as both thermal and timer program")]
    AmbiguousProgramId { id: String },

    /// A program without entries has no terminator entry
    #[error("Empty program: '{id}' has no entries")]
    EmptyProgram { id: String },

    /// A function's differential sensor matches no function's sensor
    #[error("Dangling diff reference: function {sensor} uses unknown diff sensor {diff}")]
    DanglingDiffReference { sensor: String, diff: String },

    /// Sensor id is not exactly 12 hex characters
    #[error("Invalid sensor id: '{value}' is not 12 hex characters")]
    InvalidSensorId { value: String },

    /// Time of day outside 00:00..=23:59
    #[error("Invalid time of day: {hour:02}:{minute:02}")]
    InvalidTime { hour: u8, minute: u8 },

    /// Formula input index outside 0..=7
    #[error("Invalid formula index: {index} (expected 0-7)")]
    InvalidFormulaIndex { index: u8 },
}

/// Errors while decompiling a program blob
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Buffer too short for the declared content
    #[error("Buffer too short: need at least {needed} bytes, got {available}")]
    BufferTooShort { needed: usize, available: usize },

    /// A BCD byte contains a nibble above 9
    #[error("Invalid BCD digit in byte 0x{byte:02x}")]
    InvalidBcdDigit { byte: u8 },

    /// Header arithmetic mismatch; indicates a codec defect
    #[error("Internal inconsistency: fixed sections end at {actual}, expected {expected}")]
    InternalInconsistency { expected: usize, actual: usize },
}
