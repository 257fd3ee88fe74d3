//! Correlation kernel implementations.
//!
//! Every kernel computes the same zero-mean normalized cross-correlation and
//! reports the same argmax; they differ only in how the inner dot product is
//! evaluated.

use crate::image::integral::IntegralImage;
use crate::template::TemplatePlan;
use crate::ImageView;

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Minimum unnormalized variance of an image window; flatter windows are
    /// not scored.
    pub min_var_i: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self { min_var_i: 1e-8 }
    }
}

/// Best placement found by a scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the window's top-left corner.
    pub x: usize,
    /// Y coordinate (row) of the window's top-left corner.
    pub y: usize,
    /// ZNCC score in `[-1, 1]`.
    pub score: f32,
}

impl Peak {
    /// Keeps the incumbent unless `other` scores strictly higher.
    ///
    /// Scanning in row-major order with this rule yields the first maximum,
    /// matching the usual min/max-location convention.
    #[inline]
    pub(crate) fn keep_better(best: &mut Option<Peak>, other: Peak) {
        match best {
            Some(current) if other.score <= current.score => {}
            _ => *best = Some(other),
        }
    }
}

/// Kernel trait for scoring and scan operations.
pub trait Kernel {
    /// Computes the score at a single placement (top-left coordinates).
    ///
    /// Returns `None` when the window does not fit or is too flat to score.
    fn score_at(
        image: ImageView<'_, u8>,
        integral: &IntegralImage,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        params: ScanParams,
    ) -> Option<f32>;

    /// Scans every valid placement and returns the best one.
    fn scan_best(
        image: ImageView<'_, u8>,
        integral: &IntegralImage,
        plan: &TemplatePlan,
        params: ScanParams,
    ) -> Option<Peak> {
        if !image.fits(plan.width(), plan.height()) {
            return None;
        }
        let max_x = image.width() - plan.width();
        let max_y = image.height() - plan.height();
        let mut best = None;
        for y in 0..=max_y {
            for x in 0..=max_x {
                if let Some(score) = Self::score_at(image, integral, plan, x, y, params) {
                    Peak::keep_better(&mut best, Peak { x, y, score });
                }
            }
        }
        best
    }
}

/// Turns a correlation numerator into a bounded score.
#[inline]
pub(crate) fn normalize(dot: f64, var_t: f64, var_i: f64, min_var_i: f64) -> Option<f32> {
    if var_i <= min_var_i {
        return None;
    }
    let score = dot / (var_t * var_i).sqrt();
    if score.is_finite() {
        Some(score.clamp(-1.0, 1.0) as f32)
    } else {
        None
    }
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Kernel used by the matcher: SIMD when available, scalar otherwise.
#[cfg(not(feature = "simd"))]
pub(crate) type ZnccKernel = scalar::ZnccScalar;
#[cfg(feature = "simd")]
pub(crate) type ZnccKernel = simd::ZnccSimd;
