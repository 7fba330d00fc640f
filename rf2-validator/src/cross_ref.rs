//! Semantic cross-reference checks on parsed rows.
//!
//! Structural validation never needs anything beyond the file itself. A
//! [`CrossReferenceValidator`] sees each fully parsed row together with its
//! file context and may compare it against outside knowledge, such as a
//! terminology store. Its findings are reported separately and never make a
//! file invalid.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::filename::FileNameInfo;
use crate::row::ParsedRow;
use crate::schema::ColumnSchema;
use crate::value::CellValue;

/// Name of the column holding a row's effective time.
const EFFECTIVE_TIME_COLUMN: &str = "effectiveTime";

/// Everything a cross-reference check can see about one row.
#[derive(Debug, Clone, Copy)]
pub struct CrossReferenceRequest<'a> {
    pub row: &'a ParsedRow,
    pub schema: &'a ColumnSchema,
    pub file: &'a FileNameInfo,
    /// The release date every row is expected to carry.
    pub expected_effective_time: Option<NaiveDate>,
    /// Header names of the Refset extension columns (header cells from index 6).
    pub extension_columns: &'a [String],
    /// Identifier to UUID table for the file's release state.
    pub legacy_map: Option<&'a HashMap<u64, Uuid>>,
}

/// A check could not be carried out at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    /// The referenced component is not known to the backing store.
    #[error("Couldn't find the component with the ID {id}")]
    NotFound { id: String },

    /// The backing store could not answer.
    #[error("{0}")]
    Unavailable(String),
}

/// A semantic validator for parsed rows.
///
/// Called concurrently from the file worker pool.
pub trait CrossReferenceValidator: Send + Sync + fmt::Debug {
    /// Check one row, returning a message per mismatch (empty when the row
    /// agrees with the validator's knowledge).
    ///
    /// # Errors
    /// Returns [`LookupFailure`] when the row could not be checked.
    fn check_row(&self, request: &CrossReferenceRequest<'_>) -> Result<Vec<String>, LookupFailure>;
}

/// Checks that every row carries the expected effective time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectiveTimeValidator;

impl CrossReferenceValidator for EffectiveTimeValidator {
    fn check_row(&self, request: &CrossReferenceRequest<'_>) -> Result<Vec<String>, LookupFailure> {
        let Some(expected) = request.expected_effective_time else {
            return Ok(Vec::new());
        };
        let Some(column) = request.schema.position(EFFECTIVE_TIME_COLUMN) else {
            return Ok(Vec::new());
        };

        match request.row.value(column).and_then(CellValue::as_date) {
            Some(actual) if actual == expected => Ok(Vec::new()),
            Some(actual) => Ok(vec![format!(
                "Wrong time - expected {} but file has {}",
                expected.format("%Y%m%d"),
                actual.format("%Y%m%d")
            )]),
            None => Err(LookupFailure::Unavailable(
                "row has no effective time".to_owned(),
            )),
        }
    }
}
