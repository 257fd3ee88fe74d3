//! Exact integer integral images for window statistics.
//!
//! Tables are `(width + 1) x (height + 1)` with a zero first row and column,
//! so the sum over any window is four lookups. Both tables use `u64`, which
//! keeps the window variance exact for any 8-bit image that fits in memory.

use crate::image::ImageView;

/// Summed-area tables of intensities and squared intensities.
pub struct IntegralImage {
    width: usize,
    height: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralImage {
    /// Builds both tables in a single pass over the view.
    pub fn from_view(image: ImageView<'_, u8>) -> Self {
        let width = image.width();
        let height = image.height();
        let cols = width + 1;
        let mut sum = vec![0u64; cols * (height + 1)];
        let mut sum_sq = vec![0u64; cols * (height + 1)];

        for y in 0..height {
            let row = match image.row(y) {
                Some(row) => row,
                None => break,
            };
            let mut run = 0u64;
            let mut run_sq = 0u64;
            let above = y * cols;
            let here = (y + 1) * cols;
            for (x, &value) in row.iter().enumerate() {
                let v = u64::from(value);
                run += v;
                run_sq += v * v;
                sum[here + x + 1] = sum[above + x + 1] + run;
                sum_sq[here + x + 1] = sum_sq[above + x + 1] + run_sq;
            }
        }

        Self {
            width,
            height,
            sum,
            sum_sq,
        }
    }

    /// Returns `(sum, sum_of_squares)` over the window with top-left `(x, y)`.
    ///
    /// The caller guarantees the window lies inside the source image.
    #[inline]
    pub fn window(&self, x: usize, y: usize, width: usize, height: usize) -> (u64, u64) {
        debug_assert!(x + width <= self.width && y + height <= self.height);
        let cols = self.width + 1;
        let top = y * cols;
        let bottom = (y + height) * cols;
        let (x0, x1) = (x, x + width);
        let s = self.sum[bottom + x1] + self.sum[top + x0] - self.sum[bottom + x0] - self.sum[top + x1];
        let sq = self.sum_sq[bottom + x1] + self.sum_sq[top + x0]
            - self.sum_sq[bottom + x0]
            - self.sum_sq[top + x1];
        (s, sq)
    }

    /// Returns the unnormalized variance `sum(I^2) - sum(I)^2 / n` of a window.
    #[inline]
    pub fn window_variance(&self, x: usize, y: usize, width: usize, height: usize) -> f64 {
        let (s, sq) = self.window(x, y, width, height);
        let n = (width * height) as f64;
        let s = s as f64;
        (sq as f64 - s * s / n).max(0.0)
    }
}
