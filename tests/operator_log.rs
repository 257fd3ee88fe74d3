#![cfg(feature = "tracing")]

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use redactmatch::{
    Decision, MatchConfig, Pipeline, PipelineConfig, RedactConfig, RunReport, ScaleSweep, Template,
};
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).lines().map(str::to_owned).collect()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLog {
    type Writer = CapturedLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn noise_scene(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| {
        Rgb([rng.random(), rng.random(), rng.random()])
    })
}

fn config() -> PipelineConfig {
    PipelineConfig {
        matching: MatchConfig {
            sweep: ScaleSweep {
                min_scale: 0.8,
                max_scale: 1.2,
                steps: 5,
            },
            ..MatchConfig::default()
        },
        redact: RedactConfig {
            kernel_size: 11,
            sigma: 4.0,
            ..RedactConfig::default()
        },
        ..PipelineConfig::default()
    }
}

fn run_logged(cfg: PipelineConfig, scene: RgbImage, templates: &[Template]) -> (RunReport, Vec<String>) {
    let log = CapturedLog::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(log.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let pipeline = Pipeline::new(cfg).unwrap();
    let (_, report) =
        tracing::subscriber::with_default(subscriber, || pipeline.redact(scene, templates)).unwrap();
    (report, log.lines())
}

fn line_with<'a>(lines: &'a [String], needle: &str) -> &'a str {
    lines
        .iter()
        .find(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("no log line contains {needle:?}: {lines:#?}"))
}

#[test]
fn below_threshold_template_logs_a_skip_with_its_score() {
    let cfg = PipelineConfig {
        redact: RedactConfig {
            threshold: 0.9,
            ..config().redact
        },
        ..config()
    };
    let stranger = Template::from_rgb("stranger", &noise_scene(16, 12, 99));

    let (report, lines) = run_logged(cfg, noise_scene(120, 90, 2), &[stranger]);

    assert_eq!(report.templates[0].outcome.decision, Decision::BelowThreshold);
    let line = line_with(&lines, "skipped stranger: score");
    assert!(line.contains("below threshold 0.90"), "{line}");
    assert!(line.contains("INFO"), "{line}");
}

#[test]
fn redacted_template_logs_its_score() {
    let scene = noise_scene(120, 90, 3);
    let badge = image::imageops::crop_imm(&scene, 30, 20, 20, 15).to_image();
    let badge = Template::from_rgb("badge", &badge);

    let (report, lines) = run_logged(config(), scene, &[badge]);

    assert_eq!(report.templates[0].outcome.decision, Decision::Redacted);
    let line = line_with(&lines, "redacted badge (score 1.00)");
    assert!(line.contains("INFO"), "{line}");
}

#[test]
fn flat_template_logs_no_scorable_placement() {
    let flat = Template::from_rgb("blank", &RgbImage::from_pixel(10, 8, Rgb([128, 128, 128])));

    let (report, lines) = run_logged(config(), noise_scene(60, 40, 4), &[flat]);

    assert_eq!(report.templates[0].outcome.decision, Decision::NoMatch);
    let line = line_with(&lines, "skipped blank: no scorable placement");
    assert!(line.contains("WARN"), "{line}");
    assert!(!lines.iter().any(|l| l.contains("no feasible scale")));
}

#[test]
fn upscale_only_sweep_that_never_fits_logs_no_feasible_scale() {
    let cfg = PipelineConfig {
        matching: MatchConfig {
            sweep: ScaleSweep {
                min_scale: 1.5,
                max_scale: 2.0,
                steps: 3,
            },
            ..MatchConfig::default()
        },
        ..config()
    };
    let wide = Template::from_rgb("wide", &noise_scene(30, 10, 5));

    let (report, lines) = run_logged(cfg, noise_scene(40, 30, 6), &[wide]);

    assert_eq!(report.templates[0].outcome.decision, Decision::NoMatch);
    let line = line_with(&lines, "skipped wide: no feasible scale");
    assert!(line.contains("WARN"), "{line}");
}
