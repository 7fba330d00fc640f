//! Typed cell values.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rf2_id::{Sctid, SctidError, validate_sctid};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Length of the canonical hyphenated UUID form.
const UUID_LENGTH: usize = 36;

/// Length of a date-only time value (`yyyyMMdd`).
const DATE_LENGTH: usize = 8;

/// The data type of one schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Signed 32-bit base-10 integer.
    Integer,
    /// `0` or `1`.
    Boolean,
    /// SNOMED CT identifier.
    Identifier,
    /// A UUID when 36 characters long, otherwise an identifier.
    IdentifierOrUuid,
    /// Any non-empty text.
    String,
    /// `yyyyMMdd` date or `yyyyMMddTHHmmss` timestamp with offset.
    Time,
    /// Canonical hyphenated UUID.
    Uuid,
    /// Case-insensitive `true` or `false`.
    UuidBoolean,
}

/// A successfully parsed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Integer(i32),
    Boolean(bool),
    Identifier(Sctid),
    Uuid(Uuid),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<FixedOffset>),
    UuidBoolean(bool),
}

impl CellValue {
    /// The identifier, if this cell holds one.
    #[must_use]
    pub fn as_sctid(&self) -> Option<Sctid> {
        match self {
            Self::Identifier(id) => Some(*id),
            _ => None,
        }
    }

    /// The UUID, if this cell holds one.
    #[must_use]
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(uuid) => Some(*uuid),
            _ => None,
        }
    }

    /// The calendar date of a time cell.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Timestamp(ts) => Some(ts.date_naive()),
            _ => None,
        }
    }
}

/// Why a cell could not be parsed.
///
/// The display text is the reason fragment used in
/// `Data on line N column C is illegal - REASON`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellParseError {
    #[error("should be an Integer")]
    Integer,

    #[error("should be '0' (false) or '1' (true)")]
    Boolean,

    #[error("should be a SCTID: {0}")]
    Identifier(#[source] SctidError),

    #[error("should be a SCTID or UUID")]
    IdentifierOrUuid,

    #[error("No data found")]
    Empty,

    #[error("unparsable time value")]
    Time,

    #[error("should be a UUID")]
    Uuid,

    #[error("should be 'true' or 'false'")]
    UuidBoolean,
}

impl CellParseError {
    /// Identifier failures are integrity errors rather than plain parse errors.
    #[must_use]
    pub fn is_checksum(&self) -> bool {
        matches!(self, Self::Identifier(_))
    }
}

impl DataType {
    /// Parse one raw cell as this data type.
    ///
    /// # Errors
    /// Returns [`CellParseError`] naming the rule the value broke.
    pub fn parse(self, raw: &str) -> Result<CellValue, CellParseError> {
        match self {
            Self::Integer => raw
                .parse::<i32>()
                .map(CellValue::Integer)
                .map_err(|_| CellParseError::Integer),
            Self::Boolean => match raw {
                "0" => Ok(CellValue::Boolean(false)),
                "1" => Ok(CellValue::Boolean(true)),
                _ => Err(CellParseError::Boolean),
            },
            Self::Identifier => validate_sctid(raw)
                .map(CellValue::Identifier)
                .map_err(CellParseError::Identifier),
            Self::IdentifierOrUuid => {
                let parsed = if raw.len() == UUID_LENGTH {
                    parse_uuid(raw).map(CellValue::Uuid)
                } else {
                    validate_sctid(raw).ok().map(CellValue::Identifier)
                };
                parsed.ok_or(CellParseError::IdentifierOrUuid)
            }
            Self::String => {
                if raw.is_empty() {
                    Err(CellParseError::Empty)
                } else {
                    Ok(CellValue::Text(raw.to_owned()))
                }
            }
            Self::Time => parse_time(raw).ok_or(CellParseError::Time),
            Self::Uuid => parse_uuid(raw)
                .map(CellValue::Uuid)
                .ok_or(CellParseError::Uuid),
            Self::UuidBoolean => {
                if raw.eq_ignore_ascii_case("true") {
                    Ok(CellValue::UuidBoolean(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Ok(CellValue::UuidBoolean(false))
                } else {
                    Err(CellParseError::UuidBoolean)
                }
            }
        }
    }
}

/// Only the canonical hyphenated form is accepted.
fn parse_uuid(raw: &str) -> Option<Uuid> {
    if raw.len() != UUID_LENGTH {
        return None;
    }
    Uuid::parse_str(raw).ok()
}

/// Parse `yyyyMMdd`, or `yyyyMMddTHHmmss` followed by `Z`, `±HH`, `±HHMM` or `±HH:MM`.
fn parse_time(raw: &str) -> Option<CellValue> {
    if raw.len() == DATE_LENGTH {
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        return NaiveDate::parse_from_str(raw, "%Y%m%d")
            .ok()
            .map(CellValue::Date);
    }

    let normalized = normalize_offset(raw)?;
    DateTime::parse_from_str(&normalized, "%Y%m%dT%H%M%S%z")
        .ok()
        .map(CellValue::Timestamp)
}

/// Rewrite the zone suffix to `±HHMM`.
fn normalize_offset(raw: &str) -> Option<String> {
    if let Some(stem) = raw.strip_suffix('Z') {
        return Some(format!("{stem}+0000"));
    }

    let sign_at = raw.rfind(['+', '-'])?;
    let (stem, zone) = raw.split_at(sign_at);
    let digits: String = zone[1..].chars().filter(|c| *c != ':').collect();
    let sign = &zone[..1];
    match digits.len() {
        2 => Some(format!("{stem}{sign}{digits}00")),
        4 => Some(format!("{stem}{sign}{digits}")),
        _ => None,
    }
}
