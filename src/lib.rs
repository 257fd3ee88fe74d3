//! Redactmatch finds known templates in a photograph and blurs them out.
//!
//! Each template is searched over a sweep of uniform scale factors with
//! zero-mean normalized cross-correlation (ZNCC) against the grayscale scene.
//! The best match per template is redacted (blurred and outlined) on a shared
//! color output buffer when its score reaches a threshold. Edits are applied
//! in catalog order.
//!
//! Optional features:
//! - `rayon`: parallel scan and per-template search.
//! - `simd`: vectorized correlation dot product.
//! - `tracing`: spans and operator log lines.

pub mod image;
pub mod kernel;
pub mod pipeline;
pub mod redact;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use crate::image::ImageView;
pub use kernel::{Kernel, Peak, ScanParams};
pub use pipeline::{Pipeline, PipelineConfig, RunReport, TemplateReport};
pub use redact::{Compositor, Decision, RedactConfig, RedactStyle, RedactionOutcome, Region};
pub use search::{match_template, BestMatch, Candidate, MatchConfig, Matcher, ScaleSweep};
pub use template::{load_catalog, Template, TemplateFilter};
pub use util::{RedactError, RedactResult};
