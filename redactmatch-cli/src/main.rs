use clap::Parser;
use redactmatch::pipeline::DEFAULT_OUTPUT;
use redactmatch::{
    Decision, MatchConfig, Pipeline, PipelineConfig, RedactConfig, RedactStyle, RunReport,
    ScaleSweep, TemplateFilter,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Find templates in a scene and blur them out")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Scene image (overrides `scene_path`).
    #[arg(long, value_name = "FILE")]
    scene: Option<PathBuf>,
    /// Template directory (overrides `templates_dir`).
    #[arg(long, value_name = "DIR")]
    templates: Option<PathBuf>,
    /// Output image (overrides `output_path`).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Write the JSON report here instead of stdout.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Log span timings in addition to per-template lines.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FilterJson {
    ignore: Vec<String>,
    extensions: Vec<String>,
}

impl Default for FilterJson {
    fn default() -> Self {
        let filter = TemplateFilter::default();
        Self {
            ignore: filter.ignore,
            extensions: filter.extensions,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    min_scale: f64,
    max_scale: f64,
    steps: usize,
    min_var_i: f64,
    parallel: bool,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            min_scale: cfg.sweep.min_scale,
            max_scale: cfg.sweep.max_scale,
            steps: cfg.sweep.steps,
            min_var_i: cfg.min_var_i,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StyleConfig {
    Blur,
    Outline,
}

impl From<StyleConfig> for RedactStyle {
    fn from(value: StyleConfig) -> Self {
        match value {
            StyleConfig::Blur => RedactStyle::Blur,
            StyleConfig::Outline => RedactStyle::Outline,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RedactConfigJson {
    threshold: f32,
    kernel_size: usize,
    sigma: f64,
    outline_color: [u8; 3],
    stroke: u32,
    style: StyleConfig,
}

impl Default for RedactConfigJson {
    fn default() -> Self {
        let cfg = RedactConfig::default();
        Self {
            threshold: cfg.threshold,
            kernel_size: cfg.kernel_size,
            sigma: cfg.sigma,
            outline_color: cfg.outline_color,
            stroke: cfg.stroke,
            style: StyleConfig::Blur,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    scene_path: Option<PathBuf>,
    templates_dir: Option<PathBuf>,
    output_path: PathBuf,
    max_width: Option<u32>,
    filter: FilterJson,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
    redact: RedactConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scene_path: None,
            templates_dir: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            max_width: None,
            filter: FilterJson::default(),
            match_cfg: MatchConfigJson::default(),
            redact: RedactConfigJson::default(),
        }
    }
}

impl Config {
    fn pipeline_config(self) -> PipelineConfig {
        PipelineConfig {
            matching: MatchConfig {
                sweep: ScaleSweep {
                    min_scale: self.match_cfg.min_scale,
                    max_scale: self.match_cfg.max_scale,
                    steps: self.match_cfg.steps,
                },
                min_var_i: self.match_cfg.min_var_i,
                parallel: self.match_cfg.parallel,
            },
            redact: RedactConfig {
                threshold: self.redact.threshold,
                kernel_size: self.redact.kernel_size,
                sigma: self.redact.sigma,
                outline_color: self.redact.outline_color,
                stroke: self.redact.stroke,
                style: self.redact.style.into(),
            },
            filter: TemplateFilter {
                ignore: self.filter.ignore,
                extensions: self.filter.extensions,
            },
            max_width: self.max_width,
        }
    }
}

#[derive(Debug, Serialize)]
struct TemplateRecord {
    name: String,
    decision: &'static str,
    score: Option<f32>,
    x: Option<u32>,
    y: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    scale: Option<f64>,
}

#[derive(Debug, Serialize)]
struct Output {
    output_path: PathBuf,
    scene_width: u32,
    scene_height: u32,
    redacted: usize,
    templates: Vec<TemplateRecord>,
}

fn decision_name(decision: Decision) -> &'static str {
    match decision {
        Decision::Redacted => "redacted",
        Decision::BelowThreshold => "below_threshold",
        Decision::NoMatch => "no_match",
        Decision::OutOfBounds => "out_of_bounds",
        Decision::TemplateTooLarge => "template_too_large",
    }
}

fn build_output(report: RunReport, output_path: PathBuf) -> Output {
    let redacted = report.redacted_count();
    let templates = report
        .templates
        .into_iter()
        .map(|t| TemplateRecord {
            name: t.name,
            decision: decision_name(t.outcome.decision),
            score: t.outcome.score,
            x: t.best.map(|b| b.x),
            y: t.best.map(|b| b.y),
            width: t.best.map(|b| b.width),
            height: t.best.map(|b| b.height),
            scale: t.best.map(|b| b.scale),
        })
        .collect();
    Output {
        output_path,
        scene_width: report.scene_width,
        scene_height: report.scene_height,
        redacted,
        templates,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let span_events = if cli.trace {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("redactmatch=info".parse()?))
        .with_span_events(span_events)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config: Config = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    if let Some(scene) = cli.scene {
        config.scene_path = Some(scene);
    }
    if let Some(templates) = cli.templates {
        config.templates_dir = Some(templates);
    }
    if let Some(output) = cli.output {
        config.output_path = output;
    }

    let scene_path = config
        .scene_path
        .take()
        .ok_or("scene_path must be set in the config or with --scene")?;
    let templates_dir = config
        .templates_dir
        .take()
        .ok_or("templates_dir must be set in the config or with --templates")?;
    let output_path = config.output_path.clone();

    let pipeline = Pipeline::new(config.pipeline_config())?;
    let report = pipeline.run(&scene_path, &templates_dir, &output_path)?;

    let json = serde_json::to_string_pretty(&build_output(report, output_path))?;
    match cli.report {
        Some(path) => {
            fs::write(&path, json)?;
            tracing::info!("wrote report to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
