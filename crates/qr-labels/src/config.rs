//! Generator configuration and batch policies.

use std::path::PathBuf;

use label_render::{DEFAULT_FONT_PATH, DEFAULT_FONT_SIZE, LabelFont};
use qr_symbol::SymbolStyle;
use serde::{Deserialize, Serialize};

/// What a batch does when a row cannot be encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failing row; no archive is produced.
    #[default]
    Abort,
    /// Leave failing rows out and list them in the batch report.
    Skip,
}

/// What a batch does when two records map to the same member name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// The later record replaces the earlier file.
    #[default]
    Overwrite,
    /// The later record gets a `_2`, `_3`, ... suffix.
    Suffix,
}

/// Settings for a [`crate::QrLabeler`].
#[derive(Debug, Clone)]
pub struct LabelerConfig {
    pub font_path: PathBuf,
    pub font_size: f32,
    pub symbol: SymbolStyle,
    pub failure_policy: FailurePolicy,
    pub collision_policy: CollisionPolicy,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            font_size: DEFAULT_FONT_SIZE,
            symbol: SymbolStyle::default(),
            failure_policy: FailurePolicy::default(),
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl LabelerConfig {
    /// Resolve the label font once: the configured file if usable, else the
    /// built-in font.
    pub fn resolve_font(&self) -> LabelFont {
        LabelFont::resolve(&self.font_path, self.font_size)
    }
}
