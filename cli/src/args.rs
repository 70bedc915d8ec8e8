use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use label_render::{DEFAULT_FONT_PATH, DEFAULT_FONT_SIZE};
use qr_labels::{ARCHIVE_NAME, CollisionPolicy, FailurePolicy, LabelerConfig};
use qr_symbol::{DEFAULT_MODULE_SIZE, DEFAULT_QUIET_ZONE, SymbolStyle};

#[derive(Parser)]
#[command(author, version, about = "Labeled QR codes from spreadsheet rows", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub render: RenderArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that renders images.
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// TTF/OTF font for the label; the built-in font is used if missing
    #[arg(long, global = true, default_value = DEFAULT_FONT_PATH)]
    pub font: PathBuf,
    /// label font size in pixels
    #[arg(long, global = true, default_value_t = DEFAULT_FONT_SIZE)]
    pub font_size: f32,
    /// pixel size of one QR module
    #[arg(long, global = true, default_value_t = DEFAULT_MODULE_SIZE)]
    pub module_size: u32,
    /// white border around the QR symbol, in modules
    #[arg(long, global = true, default_value_t = DEFAULT_QUIET_ZONE)]
    pub quiet_zone: u32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print label and archive name of every row.
    ///
    /// Rows are numbered from 0 after the header, skipping fully blank rows.
    List {
        workbook: PathBuf,
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Render one row to a PNG file
    Preview {
        workbook: PathBuf,
        #[arg(long)]
        sheet: Option<String>,
        /// zero-based row index, header and fully blank rows excluded
        #[arg(long)]
        row: usize,
        #[arg(long, default_value = "preview.png")]
        out: PathBuf,
    },

    /// Render every row into a zip archive of PNG files
    Export {
        workbook: PathBuf,
        #[arg(long)]
        sheet: Option<String>,
        #[arg(long, default_value = ARCHIVE_NAME)]
        out: PathBuf,
        /// what to do with rows that cannot be encoded
        #[arg(long, value_enum, default_value_t = FailurePolicy::Abort)]
        on_error: FailurePolicy,
        /// what to do when two rows map to the same file name
        #[arg(long, value_enum, default_value_t = CollisionPolicy::Overwrite)]
        collisions: CollisionPolicy,
        /// print the batch report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl RenderArgs {
    pub fn config(&self) -> LabelerConfig {
        LabelerConfig {
            font_path: self.font.clone(),
            font_size: self.font_size,
            symbol: SymbolStyle {
                module_size: self.module_size,
                quiet_zone: self.quiet_zone,
            },
            ..LabelerConfig::default()
        }
    }
}
