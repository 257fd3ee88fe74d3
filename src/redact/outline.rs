//! Rectangle outlines for auditing redacted regions.

use crate::redact::Region;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Draws a `stroke`-pixel outline along the inside edge of `region`.
///
/// Nested one-pixel rectangles are drawn inward until the stroke is complete
/// or the region is exhausted, so no pixel outside `region` changes.
pub fn draw_outline(img: &mut RgbImage, region: Region, color: Rgb<u8>, stroke: u32) {
    for inset in 0..stroke {
        let width = region.width.saturating_sub(2 * inset);
        let height = region.height.saturating_sub(2 * inset);
        if width == 0 || height == 0 {
            break;
        }
        let rect = Rect::at((region.x + inset) as i32, (region.y + inset) as i32).of_size(width, height);
        draw_hollow_rect_mut(img, rect, color);
    }
}
