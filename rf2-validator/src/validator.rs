//! Per-file validation pipeline.
//!
//! Name → schema → line endings → header → rows. Every stage records its
//! errors and the pipeline carries on with whatever it could establish, so
//! a single run reports as many independent problems as possible.

use std::fs::File;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::config::ValidationConfig;
use crate::cross_ref::CrossReferenceRequest;
use crate::error::{ErrorKind, LookupError, ValidationError};
use crate::filename::classify_file_name;
use crate::legacy_map::LegacyIdMap;
use crate::line_ending::check_line_endings;
use crate::report::FileValidationResult;
use crate::row::{RowOutcome, validate_row};
use crate::schema::{ColumnSchema, REFSET_BASE_COLUMNS, check_header, resolve_schema};
use crate::strategy::fs::{numbered_lines, open_text};

/// Shared, read-only inputs for every file in a run.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub config: &'a ValidationConfig,
    pub legacy_map: Option<&'a LegacyIdMap>,
}

/// Validate one release file.
///
/// `relative` is the path reported to the user; `path` is where to read it.
#[must_use]
pub fn validate_file(path: &Path, relative: &Path, ctx: RunContext<'_>) -> FileValidationResult {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let classification = classify_file_name(&file_name);

    let mut result = FileValidationResult::new(relative.to_path_buf(), classification.info);
    result.errors.extend(classification.errors);

    if result.file_name.is_delimited_text()
        && let Err(e) = validate_content(path, ctx, &mut result)
    {
        result.errors.push(ValidationError::file(
            ErrorKind::Io,
            format!("Unable to read file: {e}"),
        ));
    }

    debug!(
        file = %relative.display(),
        errors = result.errors.len(),
        lookup_errors = result.lookup_errors.len(),
        rows = result.rows_checked,
        "Validated file"
    );
    result
}

fn validate_content(
    path: &Path,
    ctx: RunContext<'_>,
    result: &mut FileValidationResult,
) -> io::Result<()> {
    let line_endings = check_line_endings(File::open(path)?)?;
    result.errors.extend(line_endings.errors());

    let mut lines = numbered_lines(open_text(path)?, 1);
    let header_line = match lines.next() {
        Some((_, line)) => String::from_utf8(line?)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        None => String::new(),
    };

    if header_line.is_empty() {
        result.errors.push(ValidationError::file(
            ErrorKind::HeaderMismatch,
            "File is missing the required header line",
        ));
        return Ok(());
    }
    let header: Vec<&str> = header_line.split('\t').collect();

    let resolution = resolve_schema(&result.file_name);
    result.errors.extend(resolution.errors);
    let Some(schema) = resolution.schema else {
        return Ok(());
    };
    result.errors.extend(check_header(&schema, &header));

    let rows = RowContext {
        schema: &schema,
        header: &header,
        ctx,
    };

    // A blank line splits into one empty cell and fails the length check.
    for (line, bytes) in lines {
        let Ok(text) = String::from_utf8(bytes?) else {
            result.errors.push(ValidationError::row(
                ErrorKind::Io,
                line,
                format!("Line {line} is not valid UTF-8"),
            ));
            continue;
        };
        let cells: Vec<&str> = text.split('\t').collect();
        rows.check(line, &cells, result);
    }

    Ok(())
}

struct RowContext<'a> {
    schema: &'a ColumnSchema,
    header: &'a [&'a str],
    ctx: RunContext<'a>,
}

impl RowContext<'_> {
    fn check(&self, line: usize, cells: &[&str], result: &mut FileValidationResult) {
        result.rows_checked += 1;

        let mut row = match validate_row(self.schema, self.header.len(), line, cells) {
            RowOutcome::LengthMismatch(error) => {
                result.errors.push(error);
                return;
            }
            RowOutcome::Parsed(row) => row,
        };

        let complete = row.is_complete();
        result.errors.append(&mut row.failures);

        // Only rows that line up with the schema exactly are worth a lookup.
        let Some(validator) = self.ctx.config.cross_reference.as_deref() else {
            return;
        };
        if !complete || self.header.len() != self.schema.len() {
            return;
        }

        let extension_columns: Vec<String> = if self.schema.is_refset() {
            self.header
                .iter()
                .skip(REFSET_BASE_COLUMNS)
                .map(|name| (*name).to_owned())
                .collect()
        } else {
            Vec::new()
        };
        let legacy_map = self
            .ctx
            .legacy_map
            .zip(result.file_name.release_state())
            .map(|(map, state)| map.table(state));

        let request = CrossReferenceRequest {
            row: &row,
            schema: self.schema,
            file: &result.file_name,
            expected_effective_time: self.ctx.config.expected_effective_time,
            extension_columns: &extension_columns,
            legacy_map,
        };
        match validator.check_row(&request) {
            Ok(mismatches) if mismatches.is_empty() => {}
            Ok(mismatches) => result
                .lookup_errors
                .push(LookupError::new(line, mismatches.join("; "))),
            Err(e) => result.lookup_errors.push(LookupError::new(line, e.to_string())),
        }
    }
}
