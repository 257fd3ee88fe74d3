//! Scale factor grids for the multi-scale sweep.

use crate::util::{RedactError, RedactResult};

/// Evenly spaced scale factors over a closed interval.
///
/// `steps` values are produced, including both endpoints; with `steps == 1`
/// only `min_scale` is evaluated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleSweep {
    /// Smallest scale factor (inclusive).
    pub min_scale: f64,
    /// Largest scale factor (inclusive).
    pub max_scale: f64,
    /// Number of factors in the sweep.
    pub steps: usize,
}

impl Default for ScaleSweep {
    fn default() -> Self {
        Self {
            min_scale: 0.8,
            max_scale: 1.2,
            steps: 10,
        }
    }
}

impl ScaleSweep {
    /// Checks that the sweep describes a non-empty, positive range.
    pub fn validate(&self) -> RedactResult<()> {
        if self.steps == 0 {
            return Err(RedactError::InvalidConfig("scale steps must be at least 1"));
        }
        if !(self.min_scale.is_finite() && self.max_scale.is_finite()) {
            return Err(RedactError::InvalidConfig("scale bounds must be finite"));
        }
        if self.min_scale <= 0.0 {
            return Err(RedactError::InvalidConfig("min_scale must be positive"));
        }
        if self.min_scale > self.max_scale {
            return Err(RedactError::InvalidConfig("min_scale must not exceed max_scale"));
        }
        Ok(())
    }

    /// Returns the scale factor at position `idx` of the sweep.
    pub fn factor_at(&self, idx: usize) -> f64 {
        if self.steps <= 1 {
            return self.min_scale;
        }
        let t = idx as f64 / (self.steps - 1) as f64;
        self.min_scale + (self.max_scale - self.min_scale) * t
    }

    /// Iterates the scale factors in ascending order.
    pub fn factors(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.steps).map(move |idx| self.factor_at(idx))
    }
}

/// Rounds `(width, height) * scale` to whole pixels, at least 1 in each axis.
pub fn scaled_size(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scale_axis = |v: u32| ((f64::from(v) * scale).round() as u32).max(1);
    (scale_axis(width), scale_axis(height))
}
