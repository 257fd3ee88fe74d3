//! Scalar reference kernel for ZNCC evaluation.

use crate::image::integral::IntegralImage;
use crate::kernel::{normalize, Kernel, ScanParams};
use crate::template::TemplatePlan;
use crate::ImageView;

/// Scalar ZNCC kernel.
pub struct ZnccScalar;

impl Kernel for ZnccScalar {
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
            let row_dot: f32 = img_row
                .iter()
                .zip(tpl_row)
                .map(|(&value, &t)| t * value as f32)
                .sum();
            dot += f64::from(row_dot);
        }

        normalize(dot, plan.var_t(), var_i, params.min_var_i)
    }
}
