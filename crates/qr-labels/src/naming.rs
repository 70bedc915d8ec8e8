//! Archive member naming.
//!
//! A member is named after the record's `Tajo` text, trimmed, with path
//! separators replaced by `-`, and cut to [`MAX_STEM_BYTES`]. Blank names
//! fall back to `QR_{row_index}`.
//!
//! Names are compared case-insensitively, since the scratch directory may live
//! on a case-insensitive filesystem.

use std::collections::HashMap;

use crate::QrLabelError;
use crate::config::CollisionPolicy;
use crate::payload::TAJO;
use crate::record::Record;

pub const IMAGE_EXTENSION: &str = "png";

/// Longest stem kept, in bytes. Leaves room for a collision suffix and the
/// extension under the usual 255-byte file name limit.
pub const MAX_STEM_BYTES: usize = 200;

/// Trim `raw`, replace `/` and `\` with `-` and cut it to
/// [`MAX_STEM_BYTES`] on a char boundary.
pub fn sanitize_stem(raw: &str) -> String {
    let mut stem = raw.trim().replace(['/', '\\'], "-");
    if stem.len() > MAX_STEM_BYTES {
        let cut = (0..=MAX_STEM_BYTES)
            .rev()
            .find(|&i| stem.is_char_boundary(i))
            .unwrap_or(0);
        stem.truncate(cut);
    }
    stem
}

pub fn fallback_stem(row_index: usize) -> String {
    format!("QR_{row_index}")
}

/// File stem for `record`, without extension.
pub fn archive_stem(record: &Record) -> Result<String, QrLabelError> {
    let stem = sanitize_stem(&record.require(TAJO)?.to_string());
    if stem.is_empty() {
        Ok(fallback_stem(record.index()))
    } else {
        Ok(stem)
    }
}

pub fn member_name(stem: &str) -> String {
    format!("{stem}.{IMAGE_EXTENSION}")
}

/// Name handed out by [`NameAllocator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub file_name: String,
    /// An earlier record already used this name and will be replaced.
    pub replaces_earlier: bool,
}

/// Tracks the member names of one archive and applies a [`CollisionPolicy`].
#[derive(Debug)]
pub struct NameAllocator {
    policy: CollisionPolicy,
    /// Lowercased name -> spelling handed out first.
    taken: HashMap<String, String>,
    next_suffix: HashMap<String, usize>,
}

impl NameAllocator {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            taken: HashMap::new(),
            next_suffix: HashMap::new(),
        }
    }

    pub fn allocate(&mut self, stem: &str) -> Allocation {
        let name = member_name(stem);
        let key = name.to_lowercase();

        match (self.taken.get(&key).cloned(), self.policy) {
            (None, _) => {
                self.taken.insert(key, name.clone());
                Allocation {
                    file_name: name,
                    replaces_earlier: false,
                }
            }
            // Reuse the first spelling so the earlier file is replaced on
            // case-sensitive filesystems too.
            (Some(earlier), CollisionPolicy::Overwrite) => Allocation {
                file_name: earlier,
                replaces_earlier: true,
            },
            (Some(_), CollisionPolicy::Suffix) => {
                let counter = self.next_suffix.entry(stem.to_lowercase()).or_insert(2);
                loop {
                    let candidate = member_name(&format!("{stem}_{counter}"));
                    *counter += 1;
                    let key = candidate.to_lowercase();
                    if !self.taken.contains_key(&key) {
                        self.taken.insert(key, candidate.clone());
                        return Allocation {
                            file_name: candidate,
                            replaces_earlier: false,
                        };
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CellValue;

    fn with_tajo(index: usize, tajo: impl Into<CellValue>) -> Record {
        Record::new(
            index,
            [
                ("Nivel", CellValue::from("N1")),
                ("Veta", CellValue::from("V2")),
                ("Tajo", tajo.into()),
            ],
        )
    }

    #[test]
    fn stem_is_trimmed_tajo() {
        assert_eq!(archive_stem(&with_tajo(0, "  T-07 ")).unwrap(), "T-07");
    }

    #[test]
    fn separators_become_dashes() {
        assert_eq!(archive_stem(&with_tajo(0, "A/1\\2")).unwrap(), "A-1-2");
        assert_eq!(sanitize_stem("//"), "--");
    }

    #[test]
    fn blank_tajo_falls_back_to_row_index() {
        assert_eq!(archive_stem(&with_tajo(3, "")).unwrap(), "QR_3");
        assert_eq!(archive_stem(&with_tajo(7, "   ")).unwrap(), "QR_7");
        assert_eq!(archive_stem(&with_tajo(9, CellValue::Null)).unwrap(), "QR_9");
    }

    #[test]
    fn numeric_tajo_uses_display_text() {
        assert_eq!(archive_stem(&with_tajo(0, CellValue::Integer(120))).unwrap(), "120");
    }

    #[test]
    fn missing_tajo_is_an_error() {
        let record = Record::new(1, [("Nivel", "N1"), ("Veta", "V2")]);
        assert!(matches!(
            archive_stem(&record),
            Err(QrLabelError::MissingField { field: "Tajo", .. })
        ));
    }

    #[test]
    fn overwrite_policy_reuses_name() {
        let mut names = NameAllocator::new(CollisionPolicy::Overwrite);
        let first = names.allocate("T-1");
        let second = names.allocate("T-1");
        assert_eq!(first.file_name, "T-1.png");
        assert!(!first.replaces_earlier);
        assert_eq!(second.file_name, "T-1.png");
        assert!(second.replaces_earlier);
    }

    #[test]
    fn suffix_policy_keeps_every_record() {
        let mut names = NameAllocator::new(CollisionPolicy::Suffix);
        assert_eq!(names.allocate("T-1").file_name, "T-1.png");
        assert_eq!(names.allocate("T-1").file_name, "T-1_2.png");
        assert_eq!(names.allocate("T-1").file_name, "T-1_3.png");
    }

    #[test]
    fn suffix_policy_skips_names_already_taken() {
        let mut names = NameAllocator::new(CollisionPolicy::Suffix);
        names.allocate("T-1_2");
        names.allocate("T-1");
        let third = names.allocate("T-1");
        assert_eq!(third.file_name, "T-1_3.png");
        assert!(!third.replaces_earlier);
    }

    #[test]
    fn long_stem_is_cut_on_char_boundary() {
        let ascii = "T".repeat(300);
        assert_eq!(archive_stem(&with_tajo(0, ascii.as_str())).unwrap(), "T".repeat(200));

        // Two bytes per char: 100 chars fill the limit exactly.
        let wide = "ñ".repeat(150);
        assert_eq!(sanitize_stem(&wide), "ñ".repeat(100));

        // An odd limit offset must not split a char.
        let shifted = format!("a{wide}");
        let stem = sanitize_stem(&shifted);
        assert_eq!(stem.len(), 199);
        assert!(stem.ends_with('ñ'));
    }

    #[test]
    fn suffix_policy_is_case_insensitive() {
        let mut names = NameAllocator::new(CollisionPolicy::Suffix);
        assert_eq!(names.allocate("T-1").file_name, "T-1.png");
        assert_eq!(names.allocate("t-1").file_name, "t-1_2.png");
        assert_eq!(names.allocate("T-1").file_name, "T-1_3.png");
        // A stem that folds onto an earlier suffixed name is suffixed too.
        assert_eq!(names.allocate("T-1_2").file_name, "T-1_2_2.png");
    }

    #[test]
    fn overwrite_policy_folds_case_onto_first_spelling() {
        let mut names = NameAllocator::new(CollisionPolicy::Overwrite);
        names.allocate("Tajo-A");
        let second = names.allocate("TAJO-a");
        assert_eq!(second.file_name, "Tajo-A.png");
        assert!(second.replaces_earlier);
    }
}
