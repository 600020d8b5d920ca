//! BCD and fixed-point conversions
//!
//! - Hours and minutes are packed BCD, high nibble first.
//! - Temperature is signed 8.8 fixed point, big-endian.
//! - Hysteresis is unsigned 4.4 fixed point.
//!
//! Encoding truncates toward zero. Decoding rounds to the configured
//! temperature step so values edited in the UI come back unchanged.

use crate::config::CodecConfig;
use crate::error::DecodeError;

/// Decode a packed BCD byte (0-99)
pub fn decode_bcd(byte: u8) -> Result<u8, DecodeError> {
    let high = byte >> 4;
    let low = byte & 0x0F;
    if high > 9 || low > 9 {
        return Err(DecodeError::InvalidBcdDigit { byte });
    }
    Ok(high * 10 + low)
}

/// Encode a value in 0..=99 as packed BCD
///
/// Values above 99 are not representable; callers keep hour/minute in range.
pub fn encode_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Encode a temperature as big-endian 8.8 fixed point
///
/// Values outside the representable range (-128.0 to 127.99609375) are
/// clamped to the nearest bound. NaN encodes as 0.
pub fn encode_temperature(value: f64) -> [u8; 2] {
    // `as` truncates toward zero and saturates
    let raw = (value * 256.0) as i16;
    raw.to_be_bytes()
}

/// Decode a big-endian 8.8 fixed point temperature
pub fn decode_temperature(bytes: [u8; 2], config: &CodecConfig) -> f64 {
    quantize(i16::from_be_bytes(bytes) as f64 / 256.0, config)
}

/// Encode a hysteresis as unsigned 4.4 fixed point
///
/// Negative values clamp to 0 and values above 15.9375 clamp to `0xFF`.
/// NaN encodes as 0.
pub fn encode_hysteresis(value: f64) -> u8 {
    (value * 16.0) as u8
}

/// Decode an unsigned 4.4 fixed point hysteresis
pub fn decode_hysteresis(byte: u8, config: &CodecConfig) -> f64 {
    quantize(byte as f64 / 16.0, config)
}

/// Round a value to the nearest multiple of the configured step
pub fn quantize(value: f64, config: &CodecConfig) -> f64 {
    if let Some(steps) = config.steps_per_unit() {
        return (value * steps).round() / steps;
    }
    match config.step() {
        Some(step) => {
            let scale = 10f64.powi(config.step_decimals());
            ((value / step).round() * step * scale).round() / scale
        }
        None => value,
    }
}
