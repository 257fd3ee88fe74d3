//! Named templates, their correlation plans, and the directory catalog.

use image::{GrayImage, RgbImage};

pub mod catalog;
mod plan;

pub use catalog::{load_catalog, TemplateFilter};
pub use plan::TemplatePlan;

/// A named grayscale template.
///
/// The name is the file stem the template was loaded from. Only intensity
/// is kept: matching never looks at color.
#[derive(Clone)]
pub struct Template {
    name: String,
    gray: GrayImage,
}

impl Template {
    /// Creates a template from an intensity buffer.
    pub fn new(name: impl Into<String>, gray: GrayImage) -> Self {
        Self {
            name: name.into(),
            gray,
        }
    }

    /// Creates a template from a color buffer.
    pub fn from_rgb(name: impl Into<String>, rgb: &RgbImage) -> Self {
        Self::new(name, crate::image::io::to_gray(rgb))
    }

    /// Returns the template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> u32 {
        self.gray.height()
    }

    /// Returns the intensity buffer.
    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

}
