//! Record to label text, JSON payload and QR symbol.

use qr_symbol::{QrSymbol, SymbolStyle, encode_symbol};
use tracing::debug;

use crate::record::Record;
use crate::{EncodingError, QrLabelError};

pub const NIVEL: &str = "Nivel";
pub const VETA: &str = "Veta";
pub const TAJO: &str = "Tajo";

/// Fields every record must carry, in label order.
pub const REQUIRED_FIELDS: [&str; 3] = [NIVEL, VETA, TAJO];

pub const LABEL_SEPARATOR: &str = " | ";

/// Human-readable label: `"{Nivel} | {Veta} | {Tajo}"`.
pub fn label_text(record: &Record) -> Result<String, QrLabelError> {
    let parts = REQUIRED_FIELDS
        .iter()
        .map(|&field| record.require(field).map(ToString::to_string))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(LABEL_SEPARATOR))
}

/// Compact JSON object of every field as text, in column order.
pub fn payload_json(record: &Record) -> Result<String, QrLabelError> {
    serde_json::to_string(record).map_err(|e| QrLabelError::Encoding {
        row: record.row_id(),
        source: EncodingError::Json(e),
    })
}

/// Output of [`PayloadEncoder::encode`].
#[derive(Debug, Clone)]
pub struct EncodedRecord {
    pub label: String,
    pub payload: String,
    pub symbol: QrSymbol,
}

/// Turns records into QR symbols with a fixed raster style.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadEncoder {
    style: SymbolStyle,
}

impl PayloadEncoder {
    pub fn new(style: SymbolStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> SymbolStyle {
        self.style
    }

    pub fn encode(&self, record: &Record) -> Result<EncodedRecord, QrLabelError> {
        let label = label_text(record)?;
        let payload = payload_json(record)?;
        let symbol = encode_symbol(&payload, self.style).map_err(|e| QrLabelError::Encoding {
            row: record.row_id(),
            source: EncodingError::Symbol(e),
        })?;

        debug!(
            row = record.index(),
            side = symbol.width(),
            payload_len = payload.len(),
            "Encoded record"
        );

        Ok(EncodedRecord {
            label,
            payload,
            symbol,
        })
    }
}
