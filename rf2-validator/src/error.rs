//! Error types for RF2 validation.

use std::path::PathBuf;

use serde::Serialize;

/// The kind of run-level failure that is not tied to a single file's content.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScanErrorKind {
    /// An I/O error occurred while resolving a path.
    IoError,
    /// The resolved path is outside the input root (symlink escape).
    OutsideRepository,
    /// A directory traversal error (permission denied, loop detected, etc.).
    WalkError,
    /// An exclude glob pattern could not be parsed.
    InvalidExcludePattern,
    /// The `sct2_to_uuid_map` tables could not be loaded.
    LegacyMap,
}

/// A run-level error: a path that could not be walked, or a lookup table
/// that could not be loaded.
///
/// These are distinct from [`ValidationError`], which describes a defect in
/// one release file. A non-empty list of scan errors means the run did not
/// fully cover the release package.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ScanError {
    /// The path involved.
    pub file: PathBuf,
    /// The kind of failure.
    pub kind: ScanErrorKind,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ScanError {
    #[must_use]
    pub fn new(file: PathBuf, kind: ScanErrorKind, message: impl Into<String>) -> Self {
        Self {
            file,
            kind,
            message: message.into(),
        }
    }

    /// Format the error for human-readable output.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!("{}: [scan error] {}", self.file.display(), self.message)
    }
}

/// Which unit of a file an error is attached to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScope {
    /// The file as a whole (name, header, line endings).
    File,
    /// One data row.
    Row,
    /// One cell of one data row.
    Cell,
}

/// Taxonomy of per-file validation failures.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Filename grammar, position or character-set violation.
    Naming,
    /// The content type could not be mapped to a column schema.
    UnknownContentType,
    /// Missing, extra or misnamed header column.
    HeaderMismatch,
    /// A data row has a different number of cells than the header.
    RowLength,
    /// A cell could not be parsed as its column's data type.
    CellParse,
    /// An identifier cell failed its length, check-digit or partition check.
    Checksum,
    /// The file does not use CR+LF line endings.
    LineEnding,
    /// The file could not be read.
    Io,
}

/// A single structural error found in a release file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ValidationError {
    /// Which unit the error is attached to.
    pub scope: ErrorScope,
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable error description.
    pub message: String,
    /// Line number (1-indexed, header is line 1) for row and cell errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Zero-based column index for cell and header errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ValidationError {
    /// A file-scoped error.
    #[must_use]
    pub fn file(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            scope: ErrorScope::File,
            kind,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// A file-scoped error about one header column.
    #[must_use]
    pub fn header(column: usize, message: impl Into<String>) -> Self {
        Self {
            scope: ErrorScope::File,
            kind: ErrorKind::HeaderMismatch,
            message: message.into(),
            line: Some(1),
            column: Some(column),
        }
    }

    /// A row-scoped error.
    #[must_use]
    pub fn row(kind: ErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            scope: ErrorScope::Row,
            kind,
            message: message.into(),
            line: Some(line),
            column: None,
        }
    }

    /// A cell-scoped error.
    #[must_use]
    pub fn cell(kind: ErrorKind, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            scope: ErrorScope::Cell,
            kind,
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    /// Format the error as a report line: `ERROR: {message}`.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!("ERROR: {}", self.message)
    }
}

/// A cross-reference finding for one data row.
///
/// Kept apart from [`ValidationError`]: lookup findings never make a file invalid.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct LookupError {
    /// Line number of the row.
    pub line: usize,
    /// What the lookup reported.
    pub message: String,
}

impl LookupError {
    #[must_use]
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// Format as a report line: `ERROR: Line N failed the lookup: {message}`.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!("ERROR: Line {} failed the lookup: {}", self.line, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_lookup_error() {
        let err = LookupError::new(12, "Wrong time - expected 20130731 but file has 20130131");
        assert_eq!(
            err.format_human_readable(),
            "ERROR: Line 12 failed the lookup: Wrong time - expected 20130731 but file has 20130131"
        );
    }

    #[test]
    fn test_format_cell_error() {
        let err = ValidationError::cell(
            ErrorKind::CellParse,
            3,
            1,
            "Data on line 3 column 2 is illegal - unparsable time value",
        );

        assert_eq!(err.scope, ErrorScope::Cell);
        assert_eq!(err.line, Some(3));
        assert_eq!(err.column, Some(1));
        assert_eq!(
            err.format_human_readable(),
            "ERROR: Data on line 3 column 2 is illegal - unparsable time value"
        );
    }

    #[test]
    fn test_file_error_has_no_location() {
        let err = ValidationError::file(ErrorKind::Naming, "Unknown part: foo");
        assert_eq!(err.scope, ErrorScope::File);
        assert!(err.line.is_none());
        assert!(err.column.is_none());
    }

    #[test]
    fn test_format_scan_error() {
        let err = ScanError::new(
            PathBuf::from("release/Full"),
            ScanErrorKind::WalkError,
            "Directory traversal error: permission denied",
        );
        let formatted = err.format_human_readable();
        assert!(formatted.starts_with("release/Full: [scan error]"));
        assert!(formatted.contains("permission denied"));
    }
}
