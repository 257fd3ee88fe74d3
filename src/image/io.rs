//! Convenience helpers for loading and saving images via the `image` crate.

use crate::util::{RedactError, RedactResult};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use std::fs;
use std::path::Path;

/// Decodes an image file into an RGB buffer.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> RedactResult<RgbImage> {
    let img = image::open(path).map_err(|err| RedactError::ImageIo {
        reason: err.to_string(),
    })?;
    Ok(img.to_rgb8())
}

/// Loads the scene image, mapping any failure to `SceneUnreadable`.
pub fn load_scene<P: AsRef<Path>>(path: P) -> RedactResult<RgbImage> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(RedactError::SceneUnreadable {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
        });
    }
    load_rgb_image(path).map_err(|err| RedactError::SceneUnreadable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

/// Converts an RGB buffer to single-channel intensity.
pub fn to_gray(img: &RgbImage) -> GrayImage {
    imageops::grayscale(img)
}

/// Shrinks `img` to at most `max_width` pixels wide, preserving aspect ratio.
///
/// Images already within the cap are returned unchanged.
pub fn limit_width(img: RgbImage, max_width: Option<u32>) -> RgbImage {
    let Some(max_width) = max_width else {
        return img;
    };
    if max_width == 0 || img.width() <= max_width {
        return img;
    }
    let ratio = f64::from(max_width) / f64::from(img.width());
    let height = ((f64::from(img.height()) * ratio).round() as u32).max(1);
    imageops::resize(&img, max_width, height, FilterType::Triangle)
}

/// Encodes `img` to `path`, creating parent directories as needed.
///
/// The format follows the file extension.
pub fn save_rgb_image<P: AsRef<Path>>(img: &RgbImage, path: P) -> RedactResult<()> {
    let path = path.as_ref();
    let write_err = |reason: String| RedactError::OutputWrite {
        path: path.to_path_buf(),
        reason,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| write_err(err.to_string()))?;
    }
    img.save(path).map_err(|err| write_err(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{limit_width, load_scene};
    use crate::util::RedactError;
    use image::RgbImage;

    #[test]
    fn limit_width_keeps_aspect_ratio() {
        let img = RgbImage::new(400, 300);
        let small = limit_width(img, Some(200));
        assert_eq!(small.dimensions(), (200, 150));
    }

    #[test]
    fn limit_width_ignores_images_within_cap() {
        let img = RgbImage::new(120, 80);
        assert_eq!(limit_width(img.clone(), Some(200)).dimensions(), (120, 80));
        assert_eq!(limit_width(img, None).dimensions(), (120, 80));
    }

    #[test]
    fn missing_scene_is_reported() {
        let err = load_scene("definitely/not/here.jpg").err().unwrap();
        assert!(matches!(err, RedactError::SceneUnreadable { .. }));
    }
}
