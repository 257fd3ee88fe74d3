//! Multi-scale template search.
//!
//! A template is resized across a [`ScaleSweep`], each resized copy is
//! scanned against the grayscale scene with ZNCC, and the single best
//! placement over all scales is kept.

mod matcher;
pub mod scale;

pub use matcher::{match_template, Matcher};
pub use scale::{scaled_size, ScaleSweep};

use crate::util::RedactResult;

/// Matcher configuration.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Scale factors applied to each template.
    pub sweep: ScaleSweep,
    /// Minimum unnormalized variance of a scene window to be scored.
    pub min_var_i: f64,
    /// Scan rows in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            sweep: ScaleSweep::default(),
            min_var_i: 1e-8,
            parallel: false,
        }
    }
}

impl MatchConfig {
    /// Validates the sweep and scan thresholds.
    pub fn validate(&self) -> RedactResult<()> {
        self.sweep.validate()?;
        if !self.min_var_i.is_finite() || self.min_var_i < 0.0 {
            return Err(crate::util::RedactError::InvalidConfig(
                "min_var_i must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Best placement of one resized template in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// ZNCC score in `[-1, 1]`.
    pub score: f32,
    /// Top-left x coordinate in scene pixels.
    pub x: u32,
    /// Top-left y coordinate in scene pixels.
    pub y: u32,
    /// Width of the resized template.
    pub width: u32,
    /// Height of the resized template.
    pub height: u32,
    /// Scale factor that produced this candidate.
    pub scale: f64,
}

/// The highest-scoring [`Candidate`] across a whole sweep.
pub type BestMatch = Candidate;
