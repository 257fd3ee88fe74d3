//! Separable Gaussian smoothing of a rectangular region.
//!
//! The region is filtered in isolation: samples that fall outside it are
//! mirrored back in with reflect-101 indexing (`dcb|abcd|cba`), repeatedly
//! if the kernel is wider than the region.

use crate::redact::Region;
use crate::util::{RedactError, RedactResult};
use image::RgbImage;

/// Normalized 1D Gaussian weights of odd length.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianKernel {
    weights: Vec<f32>,
}

impl GaussianKernel {
    /// Builds a kernel of `size` taps with standard deviation `sigma`.
    ///
    /// `size` must be odd. A non-positive `sigma` is derived from the size as
    /// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
    pub fn new(size: usize, sigma: f64) -> RedactResult<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(RedactError::InvalidConfig("blur kernel size must be odd"));
        }
        if !sigma.is_finite() {
            return Err(RedactError::InvalidConfig("blur sigma must be finite"));
        }
        let sigma = if sigma > 0.0 {
            sigma
        } else {
            0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
        };

        let half = (size / 2) as f64;
        let denom = 2.0 * sigma * sigma;
        let raw: Vec<f64> = (0..size)
            .map(|i| {
                let d = i as f64 - half;
                (-(d * d) / denom).exp()
            })
            .collect();
        let total: f64 = raw.iter().sum();
        let weights = raw.iter().map(|w| (w / total) as f32).collect();
        Ok(Self { weights })
    }

    /// Returns the tap weights, summing to one.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

/// Maps an out-of-range index into `[0, len)` by reflect-101 mirroring.
fn reflect_101(mut idx: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    loop {
        if idx < 0 {
            idx = -idx;
        } else if idx >= len {
            idx = 2 * (len - 1) - idx;
        } else {
            return idx as usize;
        }
    }
}

/// Blurs `region` of `img` in place.
///
/// The region must already be clipped to the image.
pub fn gaussian_blur_region(img: &mut RgbImage, region: Region, kernel: &GaussianKernel) {
    let width = region.width as usize;
    let height = region.height as usize;
    if width == 0 || height == 0 {
        return;
    }

    let mut src = vec![0f32; width * height * 3];
    for y in 0..height {
        for x in 0..width {
            let p = img.get_pixel(region.x + x as u32, region.y + y as u32);
            let base = (y * width + x) * 3;
            for c in 0..3 {
                src[base + c] = f32::from(p[c]);
            }
        }
    }

    let weights = kernel.weights();
    let half = (weights.len() / 2) as isize;

    let mut horizontal = vec![0f32; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = [0f32; 3];
            for (k, &w) in weights.iter().enumerate() {
                let sx = reflect_101(x as isize + k as isize - half, width);
                let base = (y * width + sx) * 3;
                for c in 0..3 {
                    acc[c] += w * src[base + c];
                }
            }
            horizontal[(y * width + x) * 3..][..3].copy_from_slice(&acc);
        }
    }

    for y in 0..height {
        for x in 0..width {
            let mut acc = [0f32; 3];
            for (k, &w) in weights.iter().enumerate() {
                let sy = reflect_101(y as isize + k as isize - half, height);
                let base = (sy * width + x) * 3;
                for c in 0..3 {
                    acc[c] += w * horizontal[base + c];
                }
            }
            let p = img.get_pixel_mut(region.x + x as u32, region.y + y as u32);
            for c in 0..3 {
                p[c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{gaussian_blur_region, reflect_101, GaussianKernel};
    use crate::redact::Region;
    use image::{Rgb, RgbImage};

    #[test]
    fn even_kernel_size_is_rejected() {
        assert!(GaussianKernel::new(50, 30.0).is_err());
        assert!(GaussianKernel::new(0, 1.0).is_err());
    }

    #[test]
    fn weights_are_normalized_and_symmetric() {
        let kernel = GaussianKernel::new(51, 30.0).unwrap();
        let w = kernel.weights();
        assert_eq!(w.len(), 51);
        let total: f32 = w.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        for i in 0..25 {
            assert!((w[i] - w[50 - i]).abs() < 1e-7);
        }
        assert!(w[25] > w[0]);
    }

    #[test]
    fn sigma_is_derived_when_not_positive() {
        let derived = GaussianKernel::new(5, 0.0).unwrap();
        let explicit = GaussianKernel::new(5, 1.1).unwrap();
        for (a, b) in derived.weights().iter().zip(explicit.weights()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn reflect_101_mirrors_without_repeating_edge() {
        assert_eq!(reflect_101(-1, 4), 1);
        assert_eq!(reflect_101(-3, 4), 3);
        assert_eq!(reflect_101(4, 4), 2);
        assert_eq!(reflect_101(9, 4), 3);
        assert_eq!(reflect_101(-7, 1), 0);
    }

    #[test]
    fn flat_region_is_unchanged_and_outside_untouched() {
        let mut img = RgbImage::from_pixel(10, 10, Rgb([40, 80, 120]));
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        let before = img.clone();
        let kernel = GaussianKernel::new(7, 2.0).unwrap();
        gaussian_blur_region(
            &mut img,
            Region {
                x: 3,
                y: 3,
                width: 4,
                height: 4,
            },
            &kernel,
        );
        assert_eq!(img, before);
    }

    #[test]
    fn blur_smooths_a_step_edge() {
        let mut img = RgbImage::from_fn(20, 4, |x, _| if x < 10 { Rgb([0; 3]) } else { Rgb([200; 3]) });
        let kernel = GaussianKernel::new(9, 3.0).unwrap();
        let region = Region {
            x: 0,
            y: 0,
            width: 20,
            height: 4,
        };
        gaussian_blur_region(&mut img, region, &kernel);
        let left = img.get_pixel(9, 2)[0];
        let right = img.get_pixel(10, 2)[0];
        assert!(left > 0 && left < 200);
        assert!(right > 0 && right < 200);
        assert!(left < right);
    }
}
