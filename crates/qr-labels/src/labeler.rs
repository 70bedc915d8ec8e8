//! Single-record rendering and preview.

use label_render::LabelFont;
use tracing::info;

use crate::QrLabelError;
use crate::archive::{BatchArchiver, BatchOutput};
use crate::compositor::{LabelCompositor, LabeledQr};
use crate::config::{CollisionPolicy, FailurePolicy, LabelerConfig};
use crate::payload::PayloadEncoder;
use crate::record::{Record, Table};

/// Payload encoder and label compositor wired together.
#[derive(Debug)]
pub struct QrLabeler {
    encoder: PayloadEncoder,
    compositor: LabelCompositor,
    failure_policy: FailurePolicy,
    collision_policy: CollisionPolicy,
}

impl QrLabeler {
    /// Build a labeler with an already resolved font.
    pub fn new(config: &LabelerConfig, font: LabelFont) -> Self {
        Self {
            encoder: PayloadEncoder::new(config.symbol),
            compositor: LabelCompositor::new(font),
            failure_policy: config.failure_policy,
            collision_policy: config.collision_policy,
        }
    }

    /// Build a labeler, resolving the configured font.
    pub fn from_config(config: &LabelerConfig) -> Self {
        Self::new(config, config.resolve_font())
    }

    pub fn encoder(&self) -> &PayloadEncoder {
        &self.encoder
    }

    pub fn compositor(&self) -> &LabelCompositor {
        &self.compositor
    }

    /// Encode and compose one record.
    pub fn render(&self, record: &Record) -> Result<LabeledQr, QrLabelError> {
        let encoded = self.encoder.encode(record)?;
        Ok(self.compositor.compose(encoded))
    }

    /// Render the record at `index` for display.
    pub fn preview(&self, table: &Table, index: usize) -> Result<LabeledQr, QrLabelError> {
        let record = table.get(index).ok_or(QrLabelError::RowOutOfRange {
            index,
            len: table.len(),
        })?;
        let labeled = self.render(record)?;
        info!(
            row = index,
            width = labeled.width(),
            height = labeled.height(),
            "Rendered preview"
        );
        Ok(labeled)
    }

    /// Render every record of `table` into a zip archive.
    pub fn archive(&self, table: &Table) -> Result<BatchOutput, QrLabelError> {
        BatchArchiver::new(self)
            .failure_policy(self.failure_policy)
            .collision_policy(self.collision_policy)
            .run(table)
    }
}
