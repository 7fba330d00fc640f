//! Per-row cell validation.

use crate::error::{ErrorKind, ValidationError};
use crate::schema::ColumnSchema;
use crate::value::CellValue;

/// One data row, parsed against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based line number in the file.
    pub line: usize,
    /// One slot per schema column; `None` where the cell failed to parse.
    pub values: Vec<Option<CellValue>>,
    /// Cell errors, in column order.
    pub failures: Vec<ValidationError>,
}

impl ParsedRow {
    /// Whether every schema cell parsed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The parsed value of one column.
    #[must_use]
    pub fn value(&self, column: usize) -> Option<&CellValue> {
        self.values.get(column).and_then(Option::as_ref)
    }
}

/// What happened to one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row has a different cell count than the header; not parsed.
    LengthMismatch(ValidationError),
    Parsed(ParsedRow),
}

/// Validate one data row.
///
/// The row must have exactly `header_len` cells. Each cell covered by the
/// schema is parsed independently; cells past the end of the schema are
/// ignored.
#[must_use]
pub fn validate_row(
    schema: &ColumnSchema,
    header_len: usize,
    line: usize,
    cells: &[&str],
) -> RowOutcome {
    if cells.len() != header_len {
        return RowOutcome::LengthMismatch(ValidationError::row(
            ErrorKind::RowLength,
            line,
            format!(
                "Line {line} should have {header_len} columns, but it has {}",
                cells.len()
            ),
        ));
    }

    let mut values = Vec::with_capacity(schema.len());
    let mut failures = Vec::new();
    for (column, (spec, raw)) in schema.columns().iter().zip(cells).enumerate() {
        match spec.data_type.parse(raw) {
            Ok(value) => values.push(Some(value)),
            Err(e) => {
                let kind = if e.is_checksum() {
                    ErrorKind::Checksum
                } else {
                    ErrorKind::CellParse
                };
                failures.push(ValidationError::cell(
                    kind,
                    line,
                    column,
                    format!(
                        "Data on line {line} column {} is illegal - {e}",
                        column + 1
                    ),
                ));
                values.push(None);
            }
        }
    }

    // Short header: the missing columns were already reported against the header.
    values.resize(schema.len(), None);

    RowOutcome::Parsed(ParsedRow {
        line,
        values,
        failures,
    })
}
