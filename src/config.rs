//! Codec settings
//!
//! The temperature step used to be a process-wide setting loaded once from
//! user preferences. It is now carried explicitly by [`CodecConfig`] and
//! handed to every decoder that quantizes values.

use crate::STORE_SIZE;

/// Settings shared by the compiler and the decompiler
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    /// Quantization step for decoded temperature and hysteresis (default: 0.1)
    pub temp_step: f64,

    /// Size of the device's persistent program store in bytes (default: 256)
    pub capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            temp_step: 0.1,
            capacity: STORE_SIZE,
        }
    }
}

impl CodecConfig {
    /// Create settings with a custom temperature step
    pub fn with_temp_step(temp_step: f64) -> Self {
        Self {
            temp_step,
            ..Default::default()
        }
    }

    /// Create settings for a device with a different store size
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Quantization step, if it enables quantization
    ///
    /// A non-positive or non-finite step disables quantization.
    pub(crate) fn step(&self) -> Option<f64> {
        (self.temp_step.is_finite() && self.temp_step > 0.0).then_some(self.temp_step)
    }

    /// Number of quantization steps per whole degree
    ///
    /// Only defined when the step divides one degree evenly (0.1, 0.25, 0.5).
    /// Rounding through an integral step count keeps decoded values equal to
    /// their decimal literals (e.g. `21.1`, not `21.100000000000001`).
    pub(crate) fn steps_per_unit(&self) -> Option<f64> {
        let inverse = 1.0 / self.step()?;
        let steps = inverse.round();
        (steps >= 1.0 && (inverse - steps).abs() < STEP_EPSILON * steps).then_some(steps)
    }

    /// Decimal places of the step, used to drop float noise after rounding
    pub(crate) fn step_decimals(&self) -> i32 {
        let Some(step) = self.step() else {
            return 0;
        };
        (0..MAX_STEP_DECIMALS)
            .find(|&decimals| {
                let scaled = step * 10f64.powi(decimals);
                (scaled - scaled.round()).abs() < STEP_EPSILON * scaled.max(1.0)
            })
            .unwrap_or(MAX_STEP_DECIMALS)
    }
}

/// Relative tolerance when matching a step against whole numbers
const STEP_EPSILON: f64 = 1e-9;

/// Finest step resolution honoured when cleaning rounded values
const MAX_STEP_DECIMALS: i32 = 9;
