//! Label rendering for QR sheets.
//!
//! Provides font resolution (outline font file or built-in bitmap font),
//! text measuring/drawing and caption-over-image composition.

pub mod compose;
pub mod font;
pub mod text;

// Re-exports for convenience
pub use compose::{BAND_PADDING, CAPTION_TOP, CaptionLayout, compose_captioned};
pub use font::{DEFAULT_FONT_PATH, DEFAULT_FONT_SIZE, FontError, LabelFont};
pub use text::{TextBounds, draw_text, text_bounds, text_extent};
