//! Delay range — bounds and step for the blink delay.
//!
//! DESIGN
//! ======
//! The delay is a whole number of milliseconds. Every value that reaches the
//! display or the wire passes through `DelayRange::clamp` first, so callers
//! can hand in anything a slider or a backend produces (including negatives
//! and oversized values) and get back an in-range `u32`.

pub const DEFAULT_DELAY_MIN_MS: u32 = 100;
pub const DEFAULT_DELAY_MAX_MS: u32 = 2000;
pub const DEFAULT_DELAY_STEP_MS: u32 = 100;
pub const DEFAULT_DELAY_INITIAL_MS: u32 = 700;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("delay range min {min} is greater than max {max}")]
    Inverted { min: u32, max: u32 },
    #[error("delay step must be at least 1")]
    ZeroStep,
}

/// Inclusive `[min, max]` bounds plus the button step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: u32,
    max: u32,
    step: u32,
}

impl DelayRange {
    /// # Errors
    ///
    /// Returns an error if `min > max` or `step == 0`.
    pub fn new(min: u32, max: u32, step: u32) -> Result<Self, RangeError> {
        if min > max {
            return Err(RangeError::Inverted { min, max });
        }
        if step == 0 {
            return Err(RangeError::ZeroStep);
        }
        Ok(Self { min, max, step })
    }

    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[must_use]
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Clamp an arbitrary signed value into `[min, max]`.
    #[must_use]
    pub fn clamp(&self, value: i64) -> u32 {
        let clamped = value.clamp(i64::from(self.min), i64::from(self.max));
        // In range of u32 after the clamp above.
        u32::try_from(clamped).unwrap_or(self.max)
    }

    /// Value one step slower, never past `max`.
    #[must_use]
    pub fn step_up(&self, current: u32) -> u32 {
        self.clamp(i64::from(current) + i64::from(self.step))
    }

    /// Value one step faster, never below `min`.
    #[must_use]
    pub fn step_down(&self, current: u32) -> u32 {
        self.clamp(i64::from(current) - i64::from(self.step))
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self { min: DEFAULT_DELAY_MIN_MS, max: DEFAULT_DELAY_MAX_MS, step: DEFAULT_DELAY_STEP_MS }
    }
}

#[cfg(test)]
#[path = "delay_test.rs"]
mod tests;
