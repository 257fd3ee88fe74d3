//! End-to-end redaction of a scene with a catalog of templates.
//!
//! Matching is a pure function of (scene, template) and may run across
//! templates in parallel; edits are always applied afterwards, one template
//! at a time, in catalog order.

use crate::image::io::{limit_width, load_scene, save_rgb_image, to_gray};
use crate::redact::{Compositor, Decision, RedactConfig, RedactionOutcome};
use crate::search::{BestMatch, MatchConfig, Matcher};
use crate::template::{load_catalog, Template, TemplateFilter};
use crate::trace::{trace_event, trace_log, trace_span};
use crate::util::{RedactError, RedactResult};
use image::RgbImage;
use std::path::Path;

/// Default location of the persisted output image.
pub const DEFAULT_OUTPUT: &str = "result.jpg";

/// Full pipeline configuration.
#[derive(Clone, Debug, Default)]
pub struct PipelineConfig {
    /// Scale sweep and scan settings.
    pub matching: MatchConfig,
    /// Threshold, blur and outline settings.
    pub redact: RedactConfig,
    /// Which directory entries are templates.
    pub filter: TemplateFilter,
    /// Downscale the scene to at most this width before matching.
    pub max_width: Option<u32>,
}

/// Per-template entry of a [`RunReport`].
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateReport {
    /// Template name (file stem).
    pub name: String,
    /// Best match over the sweep, if any.
    pub best: Option<BestMatch>,
    /// What the compositor did with it.
    pub outcome: RedactionOutcome,
}

/// Summary of one pipeline run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunReport {
    /// Width of the (possibly downscaled) scene.
    pub scene_width: u32,
    /// Height of the (possibly downscaled) scene.
    pub scene_height: u32,
    /// One entry per template, in catalog order.
    pub templates: Vec<TemplateReport>,
}

impl RunReport {
    /// Number of templates whose region was redacted.
    pub fn redacted_count(&self) -> usize {
        self.templates
            .iter()
            .filter(|t| t.outcome.applied())
            .count()
    }
}

/// Configured redaction pipeline.
pub struct Pipeline {
    cfg: PipelineConfig,
    compositor: Compositor,
}

impl Pipeline {
    /// Validates `cfg` and builds the pipeline.
    pub fn new(cfg: PipelineConfig) -> RedactResult<Self> {
        cfg.matching.validate()?;
        if cfg.max_width == Some(0) {
            return Err(RedactError::InvalidConfig("max_width must be positive"));
        }
        let compositor = Compositor::new(cfg.redact.clone())?;
        Ok(Self { cfg, compositor })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Loads the scene and catalog, redacts, and writes `output`.
    ///
    /// Any fatal error (scene, template directory, output) aborts the run
    /// before anything is written.
    pub fn run<S, D, O>(&self, scene_path: S, templates_dir: D, output: O) -> RedactResult<RunReport>
    where
        S: AsRef<Path>,
        D: AsRef<Path>,
        O: AsRef<Path>,
    {
        let scene = load_scene(scene_path.as_ref())?;
        let templates = load_catalog(templates_dir, &self.cfg.filter)?;
        trace_log!(
            info,
            "scanning {} with {} templates",
            scene_path.as_ref().display(),
            templates.len()
        );

        let (buffer, report) = self.redact(scene, &templates)?;
        save_rgb_image(&buffer, output.as_ref())?;
        trace_log!(info, "saved result to {}", output.as_ref().display());
        Ok(report)
    }

    /// Redacts `scene` in memory with `templates`, in slice order.
    ///
    /// Returns the output buffer (the downscaled scene plus edits) and the
    /// per-template report.
    pub fn redact(
        &self,
        scene: RgbImage,
        templates: &[Template],
    ) -> RedactResult<(RgbImage, RunReport)> {
        let scene = limit_width(scene, self.cfg.max_width);
        let gray = to_gray(&scene);
        let matcher = Matcher::new(&gray, self.cfg.matching.clone())?;
        let _span = trace_span!(
            "redact",
            width = scene.width(),
            height = scene.height(),
            templates = templates.len()
        )
        .entered();

        let matches = self.match_all(&matcher, templates);

        let mut buffer = scene;
        let mut report = RunReport {
            scene_width: buffer.width(),
            scene_height: buffer.height(),
            templates: Vec::with_capacity(templates.len()),
        };
        for (template, found) in templates.iter().zip(matches) {
            let outcome = match found {
                Searched::TooLarge => RedactionOutcome {
                    decision: Decision::TemplateTooLarge,
                    score: None,
                    region: None,
                },
                searched => self.compositor.apply(&mut buffer, searched.best().as_ref()),
            };
            log_outcome(template, found, &outcome, self.cfg.redact.threshold);
            report.templates.push(TemplateReport {
                name: template.name().to_string(),
                best: found.best(),
                outcome,
            });
        }

        trace_event!("run_complete", redacted = report.redacted_count());
        Ok((buffer, report))
    }

    #[cfg(feature = "rayon")]
    fn match_all(&self, matcher: &Matcher<'_>, templates: &[Template]) -> Vec<Searched> {
        use rayon::prelude::*;
        if self.cfg.matching.parallel {
            return templates
                .par_iter()
                .map(|t| search_one(matcher, t))
                .collect();
        }
        templates.iter().map(|t| search_one(matcher, t)).collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn match_all(&self, matcher: &Matcher<'_>, templates: &[Template]) -> Vec<Searched> {
        templates.iter().map(|t| search_one(matcher, t)).collect()
    }
}

#[derive(Clone, Copy)]
enum Searched {
    TooLarge,
    /// Every scale of the sweep was larger than the scene.
    NoFeasibleScale,
    /// Some scale fit, but the template or every window was flat.
    Unscorable,
    Found(BestMatch),
}

impl Searched {
    fn best(self) -> Option<BestMatch> {
        match self {
            Searched::Found(best) => Some(best),
            _ => None,
        }
    }
}

fn search_one(matcher: &Matcher<'_>, template: &Template) -> Searched {
    let (width, height) = (template.width(), template.height());
    if !matcher.fits(width, height) {
        return Searched::TooLarge;
    }
    match matcher.match_template(template.gray()) {
        Some(best) => Searched::Found(best),
        None if matcher.has_feasible_scale(width, height) => Searched::Unscorable,
        None => Searched::NoFeasibleScale,
    }
}

fn log_outcome(template: &Template, found: Searched, outcome: &RedactionOutcome, threshold: f32) {
    let name = template.name();
    match (outcome.decision, outcome.score) {
        (Decision::Redacted, Some(score)) => {
            trace_log!(info, "redacted {name} (score {score:.2})");
        }
        (Decision::BelowThreshold, Some(score)) => {
            trace_log!(info, "skipped {name}: score {score:.2} below threshold {threshold:.2}");
        }
        (Decision::TemplateTooLarge, _) => {
            trace_log!(
                warn,
                "skipped {name}: template {}x{} is larger than the scene",
                template.width(),
                template.height()
            );
        }
        (Decision::OutOfBounds, _) => {
            trace_log!(warn, "skipped {name}: match lies outside the output buffer");
        }
        _ => match found {
            Searched::NoFeasibleScale => {
                trace_log!(warn, "skipped {name}: no feasible scale");
            }
            _ => {
                trace_log!(warn, "skipped {name}: no scorable placement");
            }
        },
    }
}
