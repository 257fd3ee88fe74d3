//! Scale sweep over a precomputed scene.

use crate::image::integral::IntegralImage;
use crate::image::ImageView;
use crate::kernel::{Kernel, ScanParams, ZnccKernel};
use crate::search::scale::scaled_size;
use crate::search::{BestMatch, Candidate, MatchConfig};
use crate::template::TemplatePlan;
use crate::trace::{trace_event, trace_log, trace_span};
use crate::util::RedactResult;
use image::imageops::{self, FilterType};
use image::GrayImage;
use std::borrow::Cow;

/// Grayscale scene prepared for repeated template searches.
///
/// The integral image is built once and shared by every template and scale.
pub struct Matcher<'a> {
    scene: ImageView<'a, u8>,
    integral: IntegralImage,
    cfg: MatchConfig,
}

impl<'a> Matcher<'a> {
    /// Prepares `scene` for matching with `cfg`.
    pub fn new(scene: &'a GrayImage, cfg: MatchConfig) -> RedactResult<Self> {
        cfg.validate()?;
        let scene = ImageView::from_gray(scene)?;
        let integral = IntegralImage::from_view(scene);
        Ok(Self {
            scene,
            integral,
            cfg,
        })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Returns `true` if a `width x height` template can be placed in the scene.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.scene.fits(width as usize, height as usize)
    }

    /// Returns `true` if at least one scale of the sweep resizes a
    /// `width x height` template to something that fits in the scene.
    pub fn has_feasible_scale(&self, width: u32, height: u32) -> bool {
        self.cfg.sweep.factors().any(|scale| {
            let (w, h) = scaled_size(width, height, scale);
            self.fits(w, h)
        })
    }

    /// Finds the best placement of `template` over the configured scale sweep.
    ///
    /// Returns `None` when the template is larger than the scene, when every
    /// scale is infeasible, or when no window could be scored. Ties between
    /// scales keep the earlier (smaller) scale.
    pub fn match_template(&self, template: &GrayImage) -> Option<BestMatch> {
        let (tpl_width, tpl_height) = template.dimensions();
        if tpl_width == 0 || tpl_height == 0 || !self.fits(tpl_width, tpl_height) {
            return None;
        }

        let _span = trace_span!("scale_sweep", width = tpl_width, height = tpl_height).entered();
        let mut best: Option<Candidate> = None;
        for scale in self.cfg.sweep.factors() {
            let Some(candidate) = self.match_at_scale(template, scale) else {
                continue;
            };
            match best {
                Some(current) if candidate.score <= current.score => {}
                _ => best = Some(candidate),
            }
        }

        if let Some(found) = best {
            trace_event!("best_match", score = found.score, scale = found.scale);
        }
        best
    }

    /// Scores a single scale factor.
    pub fn match_at_scale(&self, template: &GrayImage, scale: f64) -> Option<Candidate> {
        let (width, height) = scaled_size(template.width(), template.height(), scale);
        if !self.fits(width, height) {
            trace_log!(debug, "scale {scale:.3} infeasible: {width}x{height} exceeds scene");
            return None;
        }

        let resized: Cow<'_, GrayImage> = if (width, height) == template.dimensions() {
            Cow::Borrowed(template)
        } else {
            Cow::Owned(imageops::resize(template, width, height, FilterType::Triangle))
        };
        let plan = TemplatePlan::from_view(ImageView::from_gray(&resized).ok()?)?;

        let params = ScanParams {
            min_var_i: self.cfg.min_var_i,
        };
        let peak = self.scan(&plan, params)?;
        Some(Candidate {
            score: peak.score,
            x: peak.x as u32,
            y: peak.y as u32,
            width,
            height,
            scale,
        })
    }

    #[cfg(feature = "rayon")]
    fn scan(&self, plan: &TemplatePlan, params: ScanParams) -> Option<crate::kernel::Peak> {
        if self.cfg.parallel {
            return crate::kernel::rayon::zncc_scan_best_par(self.scene, &self.integral, plan, params);
        }
        ZnccKernel::scan_best(self.scene, &self.integral, plan, params)
    }

    #[cfg(not(feature = "rayon"))]
    fn scan(&self, plan: &TemplatePlan, params: ScanParams) -> Option<crate::kernel::Peak> {
        ZnccKernel::scan_best(self.scene, &self.integral, plan, params)
    }
}

/// One-shot convenience wrapper around [`Matcher`].
pub fn match_template(
    scene: &GrayImage,
    template: &GrayImage,
    cfg: MatchConfig,
) -> RedactResult<Option<BestMatch>> {
    Ok(Matcher::new(scene, cfg)?.match_template(template))
}
