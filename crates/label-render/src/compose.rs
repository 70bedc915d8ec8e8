//! Caption-over-image composition.
//!
//! Layout:
//! ```text
//! ┌──────────────────────┐
//! │  10px                │
//! │     caption text     │  caption height
//! │  10px                │
//! │ ┌──────────────────┐ │
//! │ │      body        │ │  body height
//! │ └──────────────────┘ │
//! │  20px                │
//! └──────────────────────┘
//! ```
//! The caption height is the height of its inked box, and the ink is placed
//! so its top edge sits at row 10. The canvas is exactly as wide as the body.
//! A caption wider than the body is centered anyway and clipped on both sides.

use image::{GrayImage, Rgb, RgbImage};
use tracing::debug;

use crate::font::LabelFont;
use crate::text;

/// Top offset of the caption.
pub const CAPTION_TOP: u32 = 10;

/// Padding above and below the caption band.
pub const BAND_PADDING: u32 = 20;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Positions and sizes of a captioned image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionLayout {
    pub width: u32,
    pub height: u32,
    pub caption_x: i32,
    pub caption_y: i32,
    pub caption_width: u32,
    pub caption_height: u32,
    pub body_y: u32,
}

impl CaptionLayout {
    /// Lay out a caption of `caption` size above a body of `body` size.
    pub fn compute(caption: (u32, u32), body: (u32, u32)) -> Self {
        let (caption_width, caption_height) = caption;
        let (body_width, body_height) = body;
        let offset = i64::from(body_width) - i64::from(caption_width);

        Self {
            width: body_width,
            height: body_height + caption_height + BAND_PADDING * 2,
            caption_x: offset.div_euclid(2) as i32,
            caption_y: CAPTION_TOP as i32,
            caption_width,
            caption_height,
            body_y: caption_height + BAND_PADDING,
        }
    }

    /// Whether the caption extends past either side of the canvas.
    pub fn caption_overflows(&self) -> bool {
        self.caption_width > self.width
    }
}

/// Paste a grayscale image onto `base` at the given position.
///
/// Pixels outside `base` are dropped.
pub fn paste_gray(base: &mut RgbImage, top: &GrayImage, x: u32, y: u32) {
    for (dx, dy, pixel) in top.enumerate_pixels() {
        let target_x = x + dx;
        let target_y = y + dy;
        if target_x < base.width() && target_y < base.height() {
            let v = pixel[0];
            base.put_pixel(target_x, target_y, Rgb([v, v, v]));
        }
    }
}

/// Draw `caption` centered above `body` on a fresh white canvas.
pub fn compose_captioned(
    caption: &str,
    font: &LabelFont,
    body: &GrayImage,
) -> (RgbImage, CaptionLayout) {
    let bounds = text::text_bounds(font, caption);
    let layout = CaptionLayout::compute((bounds.width, bounds.height), body.dimensions());

    if layout.caption_overflows() {
        debug!(
            caption_width = layout.caption_width,
            width = layout.width,
            "Caption wider than canvas, clipping"
        );
    }

    let mut img = text::blank_canvas(layout.width, layout.height);
    text::draw_text(
        &mut img,
        font,
        layout.caption_x - bounds.x,
        layout.caption_y - bounds.y,
        caption,
        BLACK,
    );
    paste_gray(&mut img, body, 0, layout.body_y);

    (img, layout)
}
