//! Template catalog loading from a directory.
//!
//! Entries are visited in the order the filesystem lists them. Later
//! redactions can overwrite earlier ones where rectangles overlap, so the
//! order is kept as-is rather than sorted.

use crate::image::io::load_rgb_image;
use crate::template::Template;
use crate::trace::{trace_event, trace_log, trace_span};
use crate::util::{RedactError, RedactResult};
use std::fs;
use std::path::Path;

/// File names co-located with templates that are never templates themselves.
pub const DEFAULT_IGNORE: &[&str] = &[
    "test_scene.jpg",
    "task2_source.jpg",
    "task1_result.jpg",
    "result.jpg",
    ".DS_Store",
];

/// Extensions accepted as template images, compared case-insensitively.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Name-based filter deciding which directory entries are templates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateFilter {
    /// Exact file names to skip.
    pub ignore: Vec<String>,
    /// Allowed extensions without the leading dot.
    pub extensions: Vec<String>,
}

impl Default for TemplateFilter {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TemplateFilter {
    /// Returns `true` if `file_name` should be loaded as a template.
    pub fn allows(&self, file_name: &str) -> bool {
        if self.ignore.iter().any(|ignored| ignored == file_name) {
            return false;
        }
        let Some(ext) = Path::new(file_name).extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

/// Loads every template image in `dir` accepted by `filter`.
///
/// A missing or unlistable directory is fatal. Entries that fail to decode
/// are logged and skipped.
pub fn load_catalog<P: AsRef<Path>>(dir: P, filter: &TemplateFilter) -> RedactResult<Vec<Template>> {
    let dir = dir.as_ref();
    let _span = trace_span!("load_catalog", dir = %dir.display()).entered();

    let unreadable = |reason: String| RedactError::CatalogUnreadable {
        path: dir.to_path_buf(),
        reason,
    };
    let entries = fs::read_dir(dir).map_err(|err| unreadable(err.to_string()))?;

    let mut templates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| unreadable(err.to_string()))?;
        let path = entry.path();
        // Non-UTF-8 names are matched and reported lossily.
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !filter.allows(&file_name) || !path.is_file() {
            continue;
        }

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());
        match load_rgb_image(&path) {
            Ok(rgb) => templates.push(Template::from_rgb(name, &rgb)),
            Err(err) => {
                trace_log!(warn, "skipping {file_name}: {err}");
            }
        }
    }

    trace_event!("catalog_loaded", count = templates.len());
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::TemplateFilter;

    #[test]
    fn filter_honours_ignore_list_and_extensions() {
        let filter = TemplateFilter::default();
        assert!(filter.allows("logo.png"));
        assert!(filter.allows("Badge.JPEG"));
        assert!(filter.allows("face.Jpg"));
        assert!(!filter.allows("test_scene.jpg"));
        assert!(!filter.allows("result.jpg"));
        assert!(!filter.allows(".DS_Store"));
        assert!(!filter.allows("notes.txt"));
        assert!(!filter.allows("README"));
    }

    #[test]
    fn ignore_list_is_case_sensitive() {
        let filter = TemplateFilter::default();
        assert!(filter.allows("Result.jpg"));
    }

    #[test]
    fn extensions_may_carry_a_leading_dot() {
        let filter = TemplateFilter {
            ignore: Vec::new(),
            extensions: vec![".bmp".to_string()],
        };
        assert!(filter.allows("a.BMP"));
        assert!(!filter.allows("a.png"));
    }
}
