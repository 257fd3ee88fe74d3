//! SIMD-accelerated ZNCC kernel using the `wide` crate.
//!
//! Only the dot product against the zero-mean template is vectorized, 8
//! pixels at a time with `f32x8`. Window statistics come from the integral
//! image exactly as in the scalar kernel.

use crate::image::integral::IntegralImage;
use crate::kernel::{normalize, Kernel, ScanParams};
use crate::template::TemplatePlan;
use crate::ImageView;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 u8 values and convert to f32x8.
#[inline]
fn load_u8x8_as_f32x8(slice: &[u8]) -> f32x8 {
    f32x8::from([
        slice[0] as f32,
        slice[1] as f32,
        slice[2] as f32,
        slice[3] as f32,
        slice[4] as f32,
        slice[5] as f32,
        slice[6] as f32,
        slice[7] as f32,
    ])
}

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// Horizontal sum of f32x8.
#[inline]
fn hsum(v: f32x8) -> f32 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3] + arr[4] + arr[5] + arr[6] + arr[7]
}

/// SIMD-accelerated ZNCC kernel.
pub struct ZnccSimd;

impl ZnccSimd {
    #[inline]
    fn row_dot(img_row: &[u8], tpl_row: &[f32]) -> f32 {
        let width = tpl_row.len();
        let simd_end = width / LANES * LANES;
        let mut acc = f32x8::ZERO;
        let mut tx = 0;
        while tx < simd_end {
            acc += load_f32x8(&tpl_row[tx..]) * load_u8x8_as_f32x8(&img_row[tx..]);
            tx += LANES;
        }
        let mut dot = hsum(acc);
        while tx < width {
            dot += tpl_row[tx] * img_row[tx] as f32;
            tx += 1;
        }
        dot
    }
}

impl Kernel for ZnccSimd {
    fn score_at(
        image: ImageView<'_, u8>,
        integral: &IntegralImage,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        params: ScanParams,
    ) -> Option<f32> {
        let tpl_width = plan.width();
        let tpl_height = plan.height();
        if x + tpl_width > image.width() || y + tpl_height > image.height() {
            return None;
        }

        let var_i = integral.window_variance(x, y, tpl_width, tpl_height);
        if var_i <= params.min_var_i {
            return None;
        }

        let t_prime = plan.t_prime();
        let mut dot = 0.0f64;
        for ty in 0..tpl_height {
            let img_row = &image.row(y + ty)?[x..x + tpl_width];
            let tpl_row = &t_prime[ty * tpl_width..(ty + 1) * tpl_width];
            dot += f64::from(Self::row_dot(img_row, tpl_row));
        }

        normalize(dot, plan.var_t(), var_i, params.min_var_i)
    }
}
