//! Rayon-parallel scan (feature-gated).
//!
//! Rows of placements are scored in parallel; each row keeps its own first
//! maximum and rows are merged in ascending order with the same strict
//! comparison, so the result equals the sequential scan.

use crate::image::integral::IntegralImage;
use crate::kernel::{Kernel, Peak, ScanParams, ZnccKernel};
use crate::template::TemplatePlan;
use crate::ImageView;
use rayon::prelude::*;

/// Row-parallel full scan returning the best placement.
pub fn zncc_scan_best_par(
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

    let row_best: Vec<Option<Peak>> = (0..=max_y)
        .into_par_iter()
        .map(|y| {
            let mut best = None;
            for x in 0..=max_x {
                if let Some(score) = ZnccKernel::score_at(image, integral, plan, x, y, params) {
                    Peak::keep_better(&mut best, Peak { x, y, score });
                }
            }
            best
        })
        .collect();

    let mut best = None;
    for peak in row_best.into_iter().flatten() {
        Peak::keep_better(&mut best, peak);
    }
    best
}
