//! Label-over-QR composition.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, RgbImage};
use label_render::{CaptionLayout, LabelFont, compose_captioned};

use crate::QrLabelError;
use crate::naming;
use crate::payload::EncodedRecord;
use crate::record::Record;

/// A finished label image for one record.
#[derive(Debug, Clone)]
pub struct LabeledQr {
    pub label: String,
    pub payload: String,
    pub image: RgbImage,
    pub layout: CaptionLayout,
}

impl LabeledQr {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The QR symbol area of the image.
    pub fn symbol_region(&self) -> GrayImage {
        let side = self.layout.width;
        let height = self.layout.height - self.layout.body_y - label_render::BAND_PADDING;
        let region = image::imageops::crop_imm(&self.image, 0, self.layout.body_y, side, height);
        image::imageops::grayscale(&region.to_image())
    }

    /// Encode the image as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Cursor::new(Vec::new());
        self.image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

/// Draws labels above QR symbols with one resolved font.
#[derive(Debug)]
pub struct LabelCompositor {
    font: LabelFont,
}

impl LabelCompositor {
    pub fn new(font: LabelFont) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &LabelFont {
        &self.font
    }

    pub fn compose(&self, encoded: EncodedRecord) -> LabeledQr {
        let (image, layout) = compose_captioned(&encoded.label, &self.font, encoded.symbol.image());
        LabeledQr {
            label: encoded.label,
            payload: encoded.payload,
            image,
            layout,
        }
    }

    /// Archive member name for `record`, e.g. `T-07.png`.
    pub fn file_name(&self, record: &Record) -> Result<String, QrLabelError> {
        naming::archive_stem(record).map(|stem| naming::member_name(&stem))
    }
}
