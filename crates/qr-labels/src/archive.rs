//! Batch export: every record of a table into one flat zip archive.
//!
//! Images are written as PNG files into a scratch directory that lives only
//! for the duration of [`BatchArchiver::run`], then packed into an in-memory
//! zip. The scratch directory is removed whether the batch succeeds or fails.

use std::fs::File;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use image::ImageFormat;
use serde::Serialize;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::QrLabelError;
use crate::config::{CollisionPolicy, FailurePolicy};
use crate::labeler::QrLabeler;
use crate::naming::{self, NameAllocator};
use crate::record::{Record, Table};

/// Default file name offered for the archive download.
pub const ARCHIVE_NAME: &str = "QRs.zip";

const SCRATCH_PREFIX: &str = "qr-labels-";
const SCRATCH_SUBDIR: &str = "qrs";

/// A row left out of the archive under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub index: usize,
    pub tajo: Option<String>,
    pub reason: String,
}

/// What a batch run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Member names in archive order.
    pub members: Vec<String>,
    /// Names written more than once; only the last record's image survives.
    pub overwritten: Vec<String>,
    pub skipped: Vec<SkippedRow>,
}

/// Archive bytes plus the report describing them.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub bytes: Vec<u8>,
    pub report: BatchReport,
}

/// Runs one "generate all" request.
pub struct BatchArchiver<'a> {
    labeler: &'a QrLabeler,
    failure_policy: FailurePolicy,
    collision_policy: CollisionPolicy,
    scratch_root: Option<PathBuf>,
}

impl<'a> BatchArchiver<'a> {
    pub fn new(labeler: &'a QrLabeler) -> Self {
        Self {
            labeler,
            failure_policy: FailurePolicy::default(),
            collision_policy: CollisionPolicy::default(),
            scratch_root: None,
        }
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Create the scratch directory under `root` instead of the system
    /// temp directory.
    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn run(&self, table: &Table) -> Result<BatchOutput, QrLabelError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let scratch = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| QrLabelError::Io {
            context: "failed to create scratch directory".into(),
            source,
        })?;

        let output_dir = scratch.path().join(SCRATCH_SUBDIR);
        std::fs::create_dir_all(&output_dir).map_err(|source| QrLabelError::Io {
            context: format!("failed to create {}", output_dir.display()),
            source,
        })?;

        info!(rows = table.len(), "Generating QR archive");

        let mut names = NameAllocator::new(self.collision_policy);
        let mut report = BatchReport::default();

        for record in table.records() {
            match self.write_record(record, &output_dir, &mut names) {
                Ok(Some(replaced)) => report.overwritten.push(replaced),
                Ok(None) => {}
                Err(e) if self.failure_policy == FailurePolicy::Skip && e.is_row_failure() => {
                    warn!(row = record.index(), "Skipping row: {e}");
                    let row = record.row_id();
                    report.skipped.push(SkippedRow {
                        index: row.index,
                        tajo: row.tajo,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let (bytes, members) = pack_directory(&output_dir)?;
        report.members = members;

        scratch.close().map_err(|source| QrLabelError::Io {
            context: "failed to remove scratch directory".into(),
            source,
        })?;

        info!(
            members = report.members.len(),
            skipped = report.skipped.len(),
            overwritten = report.overwritten.len(),
            bytes = bytes.len(),
            "QR archive ready"
        );

        Ok(BatchOutput { bytes, report })
    }

    /// Render one record into `dir`. Returns the file name if it replaced an
    /// earlier record's image.
    fn write_record(
        &self,
        record: &Record,
        dir: &Path,
        names: &mut NameAllocator,
    ) -> Result<Option<String>, QrLabelError> {
        let labeled = self.labeler.render(record)?;
        let stem = naming::archive_stem(record)?;
        let allocation = names.allocate(&stem);

        let path = dir.join(&allocation.file_name);
        labeled
            .image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| QrLabelError::Image {
                row: record.row_id(),
                source,
            })?;

        debug!(row = record.index(), file = %allocation.file_name, "Wrote QR image");

        if allocation.replaces_earlier {
            warn!(
                row = record.index(),
                file = %allocation.file_name,
                "Archive name already used, replacing earlier image"
            );
            Ok(Some(allocation.file_name))
        } else {
            Ok(None)
        }
    }
}

/// Zip every file directly inside `dir`, flat, sorted by name.
fn pack_directory(dir: &Path) -> Result<(Vec<u8>, Vec<String>), QrLabelError> {
    let io_err = |source: io::Error| QrLabelError::Io {
        context: format!("failed to read {}", dir.display()),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => files.push((name, entry.path())),
            Err(name) => warn!(?name, "Skipping non UTF-8 file name"),
        }
    }
    files.sort();

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(zip::DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut members = Vec::with_capacity(files.len());
    for (name, path) in files {
        zip.start_file(name.as_str(), options)?;
        let mut file = File::open(&path).map_err(io_err)?;
        io::copy(&mut file, &mut zip).map_err(|source| QrLabelError::Io {
            context: format!("failed to add {name} to archive"),
            source,
        })?;
        members.push(name);
    }
    let cursor = zip.finish()?;

    Ok((cursor.into_inner(), members))
}
