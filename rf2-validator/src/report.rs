//! Validation report types.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{LookupError, ScanError, ValidationError};
use crate::filename::FileNameInfo;

/// Outcome of validating one release file.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct FileValidationResult {
    /// Path relative to the release root.
    pub path: PathBuf,
    /// What the file name decoded to.
    pub file_name: FileNameInfo,
    /// Structural errors, in discovery order.
    pub errors: Vec<ValidationError>,
    /// Cross-reference findings; these do not affect validity.
    pub lookup_errors: Vec<LookupError>,
    /// Number of data rows read.
    pub rows_checked: usize,
}

impl FileValidationResult {
    #[must_use]
    pub fn new(path: PathBuf, file_name: FileNameInfo) -> Self {
        Self {
            path,
            file_name,
            errors: Vec::new(),
            lookup_errors: Vec::new(),
            rows_checked: 0,
        }
    }

    /// A file is valid iff it has no structural errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of a validation run.
///
/// CI pipelines must check both the per-file errors and `scan_errors`.
/// A non-empty `scan_errors` means the run did not fully cover the release.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct ValidationReport {
    /// Per-file results in traversal order.
    pub files: Vec<FileValidationResult>,
    /// Number of files validated.
    pub processed_files: usize,
    /// Number of files with no structural errors.
    pub valid_files: usize,
    /// Run-level errors: walk failures, unloadable legacy maps.
    pub scan_errors: Vec<ScanError>,
    /// The run was cancelled before every file was validated.
    pub cancelled: bool,
    /// Every processed file is valid, no scan errors occurred and the run completed.
    pub ok: bool,
}

impl ValidationReport {
    /// Aggregate per-file results.
    #[must_use]
    pub fn from_results(
        files: Vec<FileValidationResult>,
        scan_errors: Vec<ScanError>,
        cancelled: bool,
    ) -> Self {
        let processed_files = files.len();
        let valid_files = files.iter().filter(|f| f.is_valid()).count();
        let ok = valid_files == processed_files && scan_errors.is_empty() && !cancelled;
        Self {
            files,
            processed_files,
            valid_files,
            scan_errors,
            cancelled,
            ok,
        }
    }

    #[must_use]
    pub fn invalid_files(&self) -> usize {
        self.processed_files - self.valid_files
    }

    /// Total structural errors across all files.
    #[must_use]
    pub fn errors_count(&self) -> usize {
        self.files.iter().map(|f| f.errors.len()).sum()
    }

    /// Total cross-reference findings across all files.
    #[must_use]
    pub fn lookup_errors_count(&self) -> usize {
        self.files.iter().map(|f| f.lookup_errors.len()).sum()
    }

    /// `Processed N files, M were valid, K had errors`
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "Processed {} files, {} were valid, {} had errors",
            self.processed_files,
            self.valid_files,
            self.invalid_files()
        )
    }
}
