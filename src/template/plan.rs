//! Template plan precomputation for ZNCC.

use crate::image::ImageView;

/// Precomputed zero-mean buffer and energy for one resized template.
///
/// With `t'` the zero-mean template and `I` the image window, ZNCC reduces to
/// `sum(t' * I) / sqrt(var_t * var_i)` because `sum(t') == 0` cancels the
/// window mean out of the numerator.
pub struct TemplatePlan {
    width: usize,
    height: usize,
    t_prime: Vec<f32>,
    var_t: f64,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    ///
    /// Returns `None` for a flat template, whose correlation is undefined.
    pub fn from_view(tpl: ImageView<'_, u8>) -> Option<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width.checked_mul(height)?;

        let mut sum = 0u64;
        for y in 0..height {
            sum += tpl.row(y)?.iter().map(|&v| u64::from(v)).sum::<u64>();
        }
        let mean = sum as f64 / count as f64;

        let mut t_prime = Vec::with_capacity(count);
        let mut var_t = 0.0f64;
        for y in 0..height {
            for &value in tpl.row(y)? {
                let d = f64::from(value) - mean;
                var_t += d * d;
                t_prime.push(d as f32);
            }
        }
        if var_t <= 1e-8 {
            return None;
        }

        Some(Self {
            width,
            height,
            t_prime,
            var_t,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn t_prime(&self) -> &[f32] {
        &self.t_prime
    }

    /// Returns `sum(t'^2)`, the template energy about its mean.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }
}
