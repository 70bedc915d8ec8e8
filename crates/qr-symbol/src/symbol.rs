//! QR symbol generation for record payloads.

use image::{GrayImage, Luma};
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};
use tracing::debug;

/// Pixel size of one QR module.
pub const DEFAULT_MODULE_SIZE: u32 = 10;

/// Width of the white border around the symbol, in modules.
pub const DEFAULT_QUIET_ZONE: u32 = 4;

#[derive(Debug, thiserror::Error)]
pub enum QrSymbolError {
    #[error("payload of {len} bytes does not fit in a QR symbol")]
    DataTooLong { len: usize },
    #[error("QR encode error: {0}")]
    Encode(#[source] QrError),
}

/// Raster settings for a rendered symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolStyle {
    pub module_size: u32,
    pub quiet_zone: u32,
}

impl Default for SymbolStyle {
    fn default() -> Self {
        Self {
            module_size: DEFAULT_MODULE_SIZE,
            quiet_zone: DEFAULT_QUIET_ZONE,
        }
    }
}

impl SymbolStyle {
    /// Side length in pixels of a symbol with `modules` modules per row.
    pub fn side_for(&self, modules: u32) -> u32 {
        (modules + self.quiet_zone * 2) * self.module_size.max(1)
    }
}

/// A rendered, square QR symbol.
#[derive(Debug, Clone)]
pub struct QrSymbol {
    image: GrayImage,
    modules: u32,
}

impl QrSymbol {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Number of modules per row, without the quiet zone.
    pub fn modules(&self) -> u32 {
        self.modules
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}

/// Encode `data` into a QR symbol.
///
/// The smallest version that fits the payload is selected at error-correction
/// level M. Dark modules are black, everything else is white.
pub fn encode_symbol(data: &str, style: SymbolStyle) -> Result<QrSymbol, QrSymbolError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M).map_err(|e| {
        match e {
            QrError::DataTooLong => QrSymbolError::DataTooLong { len: data.len() },
            other => QrSymbolError::Encode(other),
        }
    })?;

    let module_count = code.width() as u32;
    let scale = style.module_size.max(1);
    let border = style.quiet_zone * scale;
    let img_size = style.side_for(module_count);

    debug!(
        version = ?code.version(),
        module_count,
        img_size,
        payload_len = data.len(),
        "Encoded QR symbol"
    );

    let mut img = GrayImage::from_pixel(img_size, img_size, Luma([255u8]));

    for (i, color) in code.to_colors().iter().enumerate() {
        let x = (i as u32) % module_count;
        let y = (i as u32) / module_count;

        if *color == Color::Dark {
            for dx in 0..scale {
                for dy in 0..scale {
                    img.put_pixel(border + x * scale + dx, border + y * scale + dy, Luma([0u8]));
                }
            }
        }
    }

    Ok(QrSymbol {
        image: img,
        modules: module_count,
    })
}
