//! Threshold-gated redaction of matched regions.
//!
//! [`Compositor::apply`] is the only writer of the output buffer. Each call
//! either leaves the buffer untouched or blurs and outlines one rectangle;
//! calls are made in catalog order, so where rectangles overlap the later
//! template's edit is the one that shows.

pub mod blur;
pub mod outline;

use crate::search::BestMatch;
use crate::trace::trace_event;
use crate::util::{RedactError, RedactResult};
use blur::{gaussian_blur_region, GaussianKernel};
use image::{Rgb, RgbImage};
use outline::draw_outline;

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Returns `true` if pixel `(x, y)` lies inside the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x
            && y >= self.y
            && u64::from(x) < u64::from(self.x) + u64::from(self.width)
            && u64::from(y) < u64::from(self.y) + u64::from(self.height)
    }

    /// Intersects the region with a `width x height` image.
    ///
    /// Returns `None` if nothing of the region remains.
    pub fn clip(&self, width: u32, height: u32) -> Option<Region> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clipped = Region {
            x: self.x,
            y: self.y,
            width: self.width.min(width - self.x),
            height: self.height.min(height - self.y),
        };
        (clipped.width > 0 && clipped.height > 0).then_some(clipped)
    }
}

impl From<&BestMatch> for Region {
    fn from(m: &BestMatch) -> Self {
        Region {
            x: m.x,
            y: m.y,
            width: m.width,
            height: m.height,
        }
    }
}

/// What an accepted match does to the output buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RedactStyle {
    /// Blur the region, then outline it.
    #[default]
    Blur,
    /// Outline the region only.
    Outline,
}

/// Compositor configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct RedactConfig {
    /// Minimum score for a match to be redacted, in `[0, 1]`.
    pub threshold: f32,
    /// Gaussian kernel size; must be odd.
    pub kernel_size: usize,
    /// Gaussian standard deviation; non-positive derives it from the size.
    pub sigma: f64,
    /// Outline color as RGB channels.
    pub outline_color: [u8; 3],
    /// Outline stroke width in pixels.
    pub stroke: u32,
    /// Blur and outline, or outline only.
    pub style: RedactStyle,
}

impl Default for RedactConfig {
    fn default() -> Self {
        Self {
            threshold: 0.35,
            kernel_size: 51,
            sigma: 30.0,
            outline_color: [255, 0, 0],
            stroke: 3,
            style: RedactStyle::Blur,
        }
    }
}

impl RedactConfig {
    /// Validates the threshold range and blur parameters.
    pub fn validate(&self) -> RedactResult<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(RedactError::InvalidConfig("threshold must lie in [0, 1]"));
        }
        GaussianKernel::new(self.kernel_size, self.sigma)?;
        Ok(())
    }
}

/// Why a template did or did not change the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The region was edited.
    Redacted,
    /// A match was found but scored below the threshold.
    BelowThreshold,
    /// No feasible match existed.
    NoMatch,
    /// The match rectangle lies entirely outside the buffer.
    OutOfBounds,
    /// The template is larger than the scene and was never searched.
    TemplateTooLarge,
}

/// Result of one [`Compositor::apply`] call, for reporting only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RedactionOutcome {
    pub decision: Decision,
    /// Score of the best match, if there was one.
    pub score: Option<f32>,
    /// Edited region after clipping, when an edit was applied.
    pub region: Option<Region>,
}

impl RedactionOutcome {
    /// Returns `true` if the buffer was modified.
    pub fn applied(&self) -> bool {
        self.decision == Decision::Redacted
    }
}

/// Applies threshold-gated redactions to an output buffer.
pub struct Compositor {
    cfg: RedactConfig,
    kernel: GaussianKernel,
}

impl Compositor {
    /// Validates `cfg` and precomputes the blur kernel.
    pub fn new(cfg: RedactConfig) -> RedactResult<Self> {
        cfg.validate()?;
        let kernel = GaussianKernel::new(cfg.kernel_size, cfg.sigma)?;
        Ok(Self { cfg, kernel })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &RedactConfig {
        &self.cfg
    }

    /// Redacts `best` in `buffer` if it meets the threshold.
    ///
    /// The rectangle is clipped to the buffer before editing. Below the
    /// threshold the buffer is not touched at all.
    pub fn apply(&self, buffer: &mut RgbImage, best: Option<&BestMatch>) -> RedactionOutcome {
        let Some(best) = best else {
            return RedactionOutcome {
                decision: Decision::NoMatch,
                score: None,
                region: None,
            };
        };
        let score = Some(best.score);
        // Written so that a NaN score is rejected too.
        if !(best.score >= self.cfg.threshold) {
            return RedactionOutcome {
                decision: Decision::BelowThreshold,
                score,
                region: None,
            };
        }
        let Some(region) = Region::from(best).clip(buffer.width(), buffer.height()) else {
            return RedactionOutcome {
                decision: Decision::OutOfBounds,
                score,
                region: None,
            };
        };

        if self.cfg.style == RedactStyle::Blur {
            gaussian_blur_region(buffer, region, &self.kernel);
        }
        draw_outline(buffer, region, Rgb(self.cfg.outline_color), self.cfg.stroke);
        trace_event!(
            "redacted",
            x = region.x,
            y = region.y,
            width = region.width,
            height = region.height
        );

        RedactionOutcome {
            decision: Decision::Redacted,
            score,
            region: Some(region),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Compositor, Decision, RedactConfig, RedactStyle, Region};
    use crate::search::BestMatch;
    use image::{Rgb, RgbImage};

    fn checker(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x / 3 + y / 3) % 2 == 0 {
                Rgb([230, 220, 210])
            } else {
                Rgb([20, 30, 40])
            }
        })
    }

    fn best(score: f32, x: u32, y: u32, width: u32, height: u32) -> BestMatch {
        BestMatch {
            score,
            x,
            y,
            width,
            height,
            scale: 1.0,
        }
    }

    fn small_cfg() -> RedactConfig {
        RedactConfig {
            kernel_size: 7,
            sigma: 3.0,
            ..RedactConfig::default()
        }
    }

    #[test]
    fn below_threshold_leaves_buffer_identical() {
        let compositor = Compositor::new(small_cfg()).unwrap();
        let mut buffer = checker(30, 30);
        let before = buffer.clone();
        let outcome = compositor.apply(&mut buffer, Some(&best(0.3499, 5, 5, 10, 10)));
        assert_eq!(outcome.decision, Decision::BelowThreshold);
        assert!(!outcome.applied());
        assert_eq!(buffer, before);
    }

    #[test]
    fn score_at_threshold_is_accepted() {
        let compositor = Compositor::new(small_cfg()).unwrap();
        let mut buffer = checker(30, 30);
        let outcome = compositor.apply(&mut buffer, Some(&best(0.35, 5, 5, 10, 10)));
        assert!(outcome.applied());
        assert_eq!(outcome.score, Some(0.35));
    }

    #[test]
    fn missing_match_is_a_silent_skip() {
        let compositor = Compositor::new(small_cfg()).unwrap();
        let mut buffer = checker(10, 10);
        let before = buffer.clone();
        let outcome = compositor.apply(&mut buffer, None);
        assert_eq!(outcome.decision, Decision::NoMatch);
        assert_eq!(buffer, before);
    }

    #[test]
    fn edits_stay_inside_the_rectangle() {
        let compositor = Compositor::new(small_cfg()).unwrap();
        let mut buffer = checker(40, 30);
        let before = buffer.clone();
        let region = Region {
            x: 8,
            y: 6,
            width: 15,
            height: 12,
        };
        compositor.apply(&mut buffer, Some(&best(0.9, 8, 6, 15, 12)));
        let mut changed = 0;
        for (x, y, p) in buffer.enumerate_pixels() {
            if region.contains(x, y) {
                changed += usize::from(p != before.get_pixel(x, y));
            } else {
                assert_eq!(p, before.get_pixel(x, y));
            }
        }
        assert!(changed > 0);
        assert_eq!(*buffer.get_pixel(8, 6), Rgb([255, 0, 0]));
    }

    #[test]
    fn overhanging_rectangle_is_clipped() {
        let compositor = Compositor::new(small_cfg()).unwrap();
        let mut buffer = checker(20, 20);
        let outcome = compositor.apply(&mut buffer, Some(&best(0.8, 15, 16, 10, 10)));
        assert_eq!(
            outcome.region,
            Some(Region {
                x: 15,
                y: 16,
                width: 5,
                height: 4,
            })
        );

        let outcome = compositor.apply(&mut buffer, Some(&best(0.8, 25, 2, 4, 4)));
        assert_eq!(outcome.decision, Decision::OutOfBounds);
    }

    #[test]
    fn outline_style_skips_the_blur() {
        let cfg = RedactConfig {
            style: RedactStyle::Outline,
            stroke: 1,
            ..small_cfg()
        };
        let compositor = Compositor::new(cfg).unwrap();
        let mut buffer = checker(30, 30);
        let before = buffer.clone();
        compositor.apply(&mut buffer, Some(&best(0.9, 5, 5, 12, 12)));
        // Interior pixels keep their original values.
        for y in 6..16 {
            for x in 6..16 {
                assert_eq!(buffer.get_pixel(x, y), before.get_pixel(x, y));
            }
        }
        assert_eq!(*buffer.get_pixel(5, 5), Rgb([255, 0, 0]));
    }

    #[test]
    fn outline_style_writes_nothing_outside_the_rectangle() {
        let cfg = RedactConfig {
            style: RedactStyle::Outline,
            ..small_cfg()
        };
        let compositor = Compositor::new(cfg).unwrap();
        let mut buffer = checker(40, 40);
        let before = buffer.clone();
        let region = Region {
            x: 10,
            y: 15,
            width: 14,
            height: 9,
        };
        compositor.apply(&mut buffer, Some(&best(0.9, 10, 15, 14, 9)));
        for (x, y, p) in buffer.enumerate_pixels() {
            if !region.contains(x, y) {
                assert_eq!(p, before.get_pixel(x, y), "pixel ({x}, {y}) changed");
            }
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let even = RedactConfig {
            kernel_size: 50,
            ..RedactConfig::default()
        };
        assert!(Compositor::new(even).is_err());
        let threshold = RedactConfig {
            threshold: 1.5,
            ..RedactConfig::default()
        };
        assert!(Compositor::new(threshold).is_err());
    }
}
