//! Report writers.
//!
//! Plain-text formatting report and lookup report, plus JSON. Color and
//! console echoing belong to the CLI layer.

use std::io::Write;

use crate::report::ValidationReport;

/// File name of the structural report.
pub const FORMATTING_REPORT: &str = "formattingReport.txt";

/// File name of the cross-reference report.
pub const LOOKUP_REPORT: &str = "lookupReport.txt";

/// File name of the JSON report.
pub const JSON_REPORT: &str = "formattingReport.json";

/// Write the structural report.
///
/// One block per file: `Processing File <path>` followed by one
/// `ERROR: <message>` line per error and a blank line. Run-level errors come
/// next, and the last line is the summary.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_formatting_report(
    report: &ValidationReport,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    for file in &report.files {
        writeln!(writer, "Processing File {}", file.path.display())?;
        for error in &file.errors {
            writeln!(writer, "{}", error.format_human_readable())?;
        }
        writeln!(writer)?;
    }

    for scan_err in &report.scan_errors {
        writeln!(writer, "ERROR: {}", scan_err.format_human_readable())?;
    }
    if report.cancelled {
        writeln!(writer, "Validation was cancelled before every file was processed")?;
    }

    writeln!(writer, "{}", report.summary_line())?;
    Ok(())
}

/// Write the cross-reference report: the same per-file blocks as the
/// formatting report, carrying lookup findings instead.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_lookup_report(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    for file in &report.files {
        writeln!(writer, "Processing File {}", file.path.display())?;
        for error in &file.lookup_errors {
            writeln!(writer, "{}", error.format_human_readable())?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Format a `ValidationReport` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::error::{ErrorKind, LookupError, ValidationError};
    use crate::filename::{FileNameInfo, classify_file_name};
    use crate::report::FileValidationResult;

    fn sample_report() -> ValidationReport {
        let name = "sct2_Concept_Snapshot_INT_20130731.txt";
        let good = FileValidationResult::new(
            PathBuf::from("Snapshot").join(name),
            classify_file_name(name).info,
        );

        let mut bad = FileValidationResult::new(PathBuf::from("notes.md"), FileNameInfo::default());
        bad.errors.push(ValidationError::file(
            ErrorKind::Naming,
            "Invalid number of elements in the file name.  Expected 5, had 1",
        ));
        bad.lookup_errors.push(LookupError::new(3, "Wrong time"));

        ValidationReport::from_results(vec![good, bad], Vec::new(), false)
    }

    #[test]
    fn test_formatting_report() {
        let mut out = Vec::new();
        write_formatting_report(&sample_report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Processing File Snapshot"));
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Processing File notes.md");
        assert_eq!(
            lines[3],
            "ERROR: Invalid number of elements in the file name.  Expected 5, had 1"
        );
        assert_eq!(
            lines.last().copied(),
            Some("Processed 2 files, 1 were valid, 1 had errors")
        );
    }

    #[test]
    fn test_lookup_report() {
        let mut out = Vec::new();
        write_lookup_report(&sample_report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Processing File notes.md\nERROR: Line 3 failed the lookup: Wrong time\n"));
    }

    #[test]
    fn test_json_report() {
        let mut out = Vec::new();
        write_json(&sample_report(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["processed_files"], 2);
        assert_eq!(value["valid_files"], 1);
        assert_eq!(value["files"][1]["errors"][0]["kind"], "naming");
        assert_eq!(value["files"][0]["file_name"]["content_type"], "Concept");
    }
}
