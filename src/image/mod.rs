//! Grayscale views, integral images and image I/O helpers.
//!
//! Color data never reaches the correlation kernels: scenes and templates are
//! converted to `GrayImage` once and read through a row-major `ImageView<u8>`.

use crate::util::{RedactError, RedactResult};
use image::GrayImage;

pub mod integral;
pub mod io;

/// Borrowed row-major 2D view over a contiguous buffer.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
}

impl<'a> ImageView<'a, u8> {
    /// Views an `image` grayscale buffer.
    pub fn from_gray(img: &'a GrayImage) -> RedactResult<Self> {
        Self::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
    }
}

impl<'a, T> ImageView<'a, T> {
    /// Views `width * height` elements of `data` in row-major order.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> RedactResult<Self> {
        if width == 0 || height == 0 {
            return Err(RedactError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(RedactError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(RedactError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data: &data[..needed],
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns row `y`, or `None` past the last row.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Returns `true` when a `width x height` window fits inside the view.
    pub fn fits(&self, width: usize, height: usize) -> bool {
        width <= self.width && height <= self.height
    }
}
