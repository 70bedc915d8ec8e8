//! Labeled QR images from table rows.
//!
//! Each record becomes a JSON payload encoded as a QR symbol with a
//! `Nivel | Veta | Tajo` label drawn above it. Records can be rendered one at
//! a time for preview, or all at once into a zip archive of PNG files named
//! after their `Tajo` value.

pub mod archive;
pub mod compositor;
pub mod config;
pub mod labeler;
pub mod naming;
pub mod payload;
pub mod record;

use std::fmt;

use qr_symbol::QrSymbolError;

pub use archive::{ARCHIVE_NAME, BatchArchiver, BatchOutput, BatchReport, SkippedRow};
pub use compositor::{LabelCompositor, LabeledQr};
pub use config::{CollisionPolicy, FailurePolicy, LabelerConfig};
pub use labeler::QrLabeler;
pub use payload::{EncodedRecord, PayloadEncoder, REQUIRED_FIELDS, label_text, payload_json};
pub use record::{CellValue, Record, Table};

/// Identifies the record an error belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowId {
    pub index: usize,
    pub tajo: Option<String>,
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tajo {
            Some(tajo) => write!(f, "row {} (Tajo {tajo:?})", self.index),
            None => write!(f, "row {}", self.index),
        }
    }
}

/// Why a payload could not be encoded.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("payload serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Symbol(#[from] QrSymbolError),
}

/// QR label generation error type.
#[derive(Debug, thiserror::Error)]
pub enum QrLabelError {
    #[error("{row}: missing required field `{field}`")]
    MissingField { row: RowId, field: &'static str },

    #[error("{row}: {source}")]
    Encoding {
        row: RowId,
        #[source]
        source: EncodingError,
    },

    #[error("row {index} out of range (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("{row}: failed to write image: {source}")]
    Image {
        row: RowId,
        #[source]
        source: image::ImageError,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl QrLabelError {
    /// The record this error belongs to, if any.
    pub fn row(&self) -> Option<&RowId> {
        match self {
            Self::MissingField { row, .. } | Self::Encoding { row, .. } | Self::Image { row, .. } => {
                Some(row)
            }
            _ => None,
        }
    }

    /// Errors caused by the record's own data, as opposed to storage.
    pub fn is_row_failure(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::Encoding { .. })
    }
}

#[cfg(test)]
mod tests;
