//! Label font resolution.
//!
//! A label is drawn with an outline font loaded from disk when one is
//! available, otherwise with the built-in 8x8 bitmap font scaled to roughly
//! the requested pixel size.

use std::fmt;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use tracing::{info, warn};

/// Relative path checked for a bundled label font.
pub const DEFAULT_FONT_PATH: &str = "fonts/arial.ttf";

/// Default label font size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 50.0;

/// Side of one glyph cell in the built-in bitmap font.
pub const BITMAP_GLYPH_SIZE: u32 = 8;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to read font {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font format in {} (only TTF/OTF supported)", path.display())]
    InvalidFormat { path: PathBuf },
}

/// The font used to draw labels.
pub enum LabelFont {
    /// A TTF/OTF font rendered at `scale`.
    Outline {
        font: FontVec,
        scale: PxScale,
        path: PathBuf,
    },
    /// The built-in bitmap font, each glyph pixel drawn as a `pixel` square.
    Bitmap { pixel: u32 },
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline { scale, path, .. } => f
                .debug_struct("Outline")
                .field("path", path)
                .field("scale", &scale.y)
                .finish(),
            Self::Bitmap { pixel } => f.debug_struct("Bitmap").field("pixel", pixel).finish(),
        }
    }
}

impl LabelFont {
    /// Load an outline font from `path`.
    pub fn load(path: impl AsRef<Path>, size: f32) -> Result<Self, FontError> {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path).map_err(|source| FontError::Io {
            path: path.clone(),
            source,
        })?;
        let font = FontVec::try_from_vec(data)
            .map_err(|_| FontError::InvalidFormat { path: path.clone() })?;
        Ok(Self::Outline {
            font,
            scale: PxScale::from(size),
            path,
        })
    }

    /// The built-in bitmap font, scaled as close to `size` pixels as whole
    /// glyph pixels allow.
    pub fn builtin(size: f32) -> Self {
        let pixel = (size / BITMAP_GLYPH_SIZE as f32).round().max(1.0) as u32;
        Self::Bitmap { pixel }
    }

    /// Use the font at `path` if it exists and parses, else the built-in font.
    pub fn resolve(path: impl AsRef<Path>, size: f32) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "Label font not found, using built-in font");
            return Self::builtin(size);
        }
        match Self::load(path, size) {
            Ok(font) => {
                info!(path = %path.display(), size, "Using label font");
                font
            }
            Err(e) => {
                warn!("Falling back to built-in label font: {e}");
                Self::builtin(size)
            }
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Bitmap { .. })
    }
}

/// First outline font found among common install locations.
#[cfg(test)]
pub(crate) fn system_test_font(size: f32) -> Option<LabelFont> {
    const CANDIDATES: &[&str] = &[
        DEFAULT_FONT_PATH,
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    CANDIDATES
        .iter()
        .find_map(|path| LabelFont::load(path, size).ok())
}
