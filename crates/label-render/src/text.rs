//! Text measuring and drawing for labels.
//!
//! Works with either font kind of [`LabelFont`]. Outline glyphs are laid out
//! once and used both to measure the inked box and to draw it; the bitmap
//! font is blitted glyph by glyph.

use ab_glyph::{Font, FontVec, GlyphId, OutlinedGlyph, PxScale, Rect, ScaleFont, point};
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};
use imageproc::pixelops::interpolate;

use crate::font::{BITMAP_GLYPH_SIZE, LabelFont};

/// Inked bounding box of a string, relative to the origin passed to
/// [`draw_text`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl TextBounds {
    fn from_rect(rect: Rect) -> Self {
        Self {
            x: rect.min.x as i32,
            y: rect.min.y as i32,
            width: (rect.max.x - rect.min.x) as u32,
            height: (rect.max.y - rect.min.y) as u32,
        }
    }
}

/// Lay out `text` on one line starting at x = 0, baseline at the font's ascent.
fn layout_outline(font: &FontVec, scale: PxScale, text: &str) -> Vec<OutlinedGlyph> {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0f32;
    let mut prev: Option<GlyphId> = None;
    let mut glyphs = Vec::new();

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        prev = Some(id);
        glyphs.extend(font.outline_glyph(glyph));
    }

    glyphs
}

fn union(a: Rect, b: Rect) -> Rect {
    Rect {
        min: point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
        max: point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
    }
}

fn outline_bounds(font: &FontVec, scale: PxScale, text: &str) -> TextBounds {
    layout_outline(font, scale, text)
        .iter()
        .map(OutlinedGlyph::px_bounds)
        .reduce(union)
        .map(TextBounds::from_rect)
        .unwrap_or_default()
}

fn bitmap_bounds(text: &str, pixel: u32) -> TextBounds {
    // Inclusive glyph-pixel ranges of set bits.
    let mut cols: Option<(u32, u32)> = None;
    let mut rows: Option<(u32, u32)> = None;

    for (i, ch) in text.chars().enumerate() {
        let base = i as u32 * BITMAP_GLYPH_SIZE;
        for (row, bits) in bitmap_glyph(ch).iter().enumerate() {
            if *bits == 0 {
                continue;
            }
            let row = row as u32;
            let first = base + bits.trailing_zeros();
            let last = base + 7 - bits.leading_zeros();
            cols = Some(cols.map_or((first, last), |(lo, hi)| (lo.min(first), hi.max(last))));
            rows = Some(rows.map_or((row, row), |(lo, hi)| (lo.min(row), hi.max(row))));
        }
    }

    match (cols, rows) {
        (Some((left, right)), Some((top, bottom))) => TextBounds {
            x: (left * pixel) as i32,
            y: (top * pixel) as i32,
            width: (right - left + 1) * pixel,
            height: (bottom - top + 1) * pixel,
        },
        _ => TextBounds::default(),
    }
}

/// Inked bounding box of `text` when drawn with `font`.
///
/// Text without ink (empty or all spaces) has an empty box at the origin.
pub fn text_bounds(font: &LabelFont, text: &str) -> TextBounds {
    match font {
        LabelFont::Outline { font, scale, .. } => outline_bounds(font, *scale, text),
        LabelFont::Bitmap { pixel } => bitmap_bounds(text, *pixel),
    }
}

/// Width and height of the inked box of `text`.
pub fn text_extent(font: &LabelFont, text: &str) -> (u32, u32) {
    let bounds = text_bounds(font, text);
    (bounds.width, bounds.height)
}

/// Draw `text` with its line origin at (`x`, `y`).
///
/// Ink lands at `(x, y)` offset by [`text_bounds`]. Pixels falling outside
/// the image are clipped, so `x` may be negative.
pub fn draw_text(img: &mut RgbImage, font: &LabelFont, x: i32, y: i32, text: &str, color: Rgb<u8>) {
    match font {
        LabelFont::Outline { font, scale, .. } => {
            draw_outline(img, font, *scale, x, y, text, color);
        }
        LabelFont::Bitmap { pixel } => {
            let advance = (BITMAP_GLYPH_SIZE * pixel) as i32;
            for (i, ch) in text.chars().enumerate() {
                draw_bitmap_glyph(img, bitmap_glyph(ch), x + i as i32 * advance, y, *pixel, color);
            }
        }
    }
}

fn draw_outline(
    img: &mut RgbImage,
    font: &FontVec,
    scale: PxScale,
    x: i32,
    y: i32,
    text: &str,
    color: Rgb<u8>,
) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    for glyph in layout_outline(font, scale, text) {
        let bb = glyph.px_bounds();
        let left = i64::from(x) + bb.min.x as i64;
        let top = i64::from(y) + bb.min.y as i64;
        glyph.draw(|gx, gy, coverage| {
            let (px, py) = (left + i64::from(gx), top + i64::from(gy));
            if coverage > 0.0 && px >= 0 && px < w && py >= 0 && py < h {
                let pixel = img.get_pixel_mut(px as u32, py as u32);
                *pixel = interpolate(color, *pixel, coverage.min(1.0));
            }
        });
    }
}

fn bitmap_glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

// Row bytes are least-significant-bit first: bit n is column n.
fn draw_bitmap_glyph(img: &mut RgbImage, glyph: [u8; 8], x: i32, y: i32, pixel: u32, color: Rgb<u8>) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..BITMAP_GLYPH_SIZE {
            if bits & (1 << col) == 0 {
                continue;
            }
            let left = x as i64 + (col * pixel) as i64;
            let top = y as i64 + (row as u32 * pixel) as i64;
            for dy in 0..pixel as i64 {
                for dx in 0..pixel as i64 {
                    let (px, py) = (left + dx, top + dy);
                    if px >= 0 && px < w && py >= 0 && py < h {
                        img.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}

/// Create a blank white RGB image.
pub fn blank_canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::system_test_font;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn dark_pixels(img: &RgbImage) -> usize {
        img.pixels().filter(|p| p[0] < 128).count()
    }

    /// Smallest box holding every non-white pixel, as (x, y, width, height).
    fn ink_box(img: &RgbImage) -> Option<(u32, u32, u32, u32)> {
        let inked: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != WHITE)
            .map(|(x, y, _)| (x, y))
            .collect();
        let min_x = inked.iter().map(|p| p.0).min()?;
        let max_x = inked.iter().map(|p| p.0).max()?;
        let min_y = inked.iter().map(|p| p.1).min()?;
        let max_y = inked.iter().map(|p| p.1).max()?;
        Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    #[test]
    fn blank_canvas_has_correct_dimensions() {
        let img = blank_canvas(120, 30);
        assert_eq!(img.dimensions(), (120, 30));
        assert_eq!(img.get_pixel(5, 5), &Rgb([255, 255, 255]));
    }

    #[test]
    fn bitmap_bounds_match_drawn_ink() {
        let font = LabelFont::Bitmap { pixel: 2 };
        for text in ["N1 | V2 | T-07", "-", "gy", " _ "] {
            let bounds = text_bounds(&font, text);
            let mut img = blank_canvas(400, 40);
            draw_text(&mut img, &font, 5, 5, text, BLACK);

            let expected = (
                (5 + bounds.x) as u32,
                (5 + bounds.y) as u32,
                bounds.width,
                bounds.height,
            );
            assert_eq!(ink_box(&img), Some(expected), "{text:?}");
        }
    }

    #[test]
    fn bitmap_extent_is_inked_box_not_cell() {
        let font = LabelFont::Bitmap { pixel: 2 };
        let (dash_w, dash_h) = text_extent(&font, "-");
        assert!(dash_h < 16);
        assert!(dash_w < 16);
        // Counted per char, not per byte.
        assert!(text_extent(&font, "Ñ").0 <= 16);
    }

    #[test]
    fn text_without_ink_has_empty_bounds() {
        let font = LabelFont::Bitmap { pixel: 3 };
        assert_eq!(text_bounds(&font, ""), TextBounds::default());
        assert_eq!(text_extent(&font, "   "), (0, 0));
    }

    #[test]
    fn bitmap_text_draws_ink() {
        let font = LabelFont::Bitmap { pixel: 1 };
        let mut img = blank_canvas(40, 8);
        draw_text(&mut img, &font, 0, 0, "AB", BLACK);
        assert!(dark_pixels(&img) > 0);
    }

    #[test]
    fn negative_x_is_clipped_not_panicking() {
        let font = LabelFont::Bitmap { pixel: 3 };
        let mut img = blank_canvas(20, 30);
        draw_text(&mut img, &font, -50, 0, "WIDE LABEL TEXT", BLACK);
        draw_text(&mut img, &font, 10, 25, "X", BLACK);
        assert_eq!(img.dimensions(), (20, 30));
    }

    #[test]
    fn unknown_glyph_falls_back_to_question_mark() {
        assert_eq!(bitmap_glyph('\u{4e2d}'), BASIC_FONTS.get('?').unwrap());
        assert_ne!(bitmap_glyph('é'), bitmap_glyph('?'));
    }

    #[test]
    fn outline_ink_stays_inside_bounds() {
        let Some(font) = system_test_font(50.0) else {
            eprintln!("no outline font installed, skipping");
            return;
        };
        let text = "N1 | V2 | T-07";
        let bounds = text_bounds(&font, text);
        assert!(bounds.width > 0 && bounds.height > 0);

        let mut img = blank_canvas(bounds.width + 40, bounds.height + 40);
        let (x, y) = (20 - bounds.x, 20 - bounds.y);
        draw_text(&mut img, &font, x, y, text, BLACK);

        let (ink_x, ink_y, ink_w, ink_h) = ink_box(&img).unwrap();
        // px_bounds is whole-pixel conservative, so at most one empty
        // column or row on each side.
        assert!(ink_x >= 20 && ink_x <= 21);
        assert!(ink_y >= 20 && ink_y <= 21);
        assert!(ink_x + ink_w <= 20 + bounds.width);
        assert!(ink_y + ink_h <= 20 + bounds.height);
        assert!(ink_w + 2 >= bounds.width);
        assert!(ink_h + 2 >= bounds.height);
    }

    #[test]
    fn outline_height_is_ink_not_line_height() {
        let Some(font) = system_test_font(50.0) else {
            eprintln!("no outline font installed, skipping");
            return;
        };
        let LabelFont::Outline { font: face, scale, .. } = &font else {
            unreachable!()
        };
        let scaled = face.as_scaled(*scale);
        let line = (scaled.ascent() - scaled.descent()).ceil() as u32;

        let (_, height) = text_extent(&font, "N1 | V2 | T-07");
        assert!(height < line);
        // A lone dash is much shorter than the capitals around it.
        assert!(text_extent(&font, "-").1 * 3 < height);
    }
}
