//! Release file name classification.
//!
//! RF2 file names follow `{part1}_{part2}_{part3}_{part4}_{part5}.{ext}`, for
//! example `sct2_Concept_Snapshot_INT_20130731.txt`. Each token is classified
//! by its content rather than its position, so a misplaced token is still
//! identified and reported as a position mismatch.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::error::{ErrorKind, ValidationError};

/// Legacy identifier map files carry this prefix and do not follow the
/// five-part naming convention.
pub const LEGACY_MAP_PREFIX: &str = "sct2_to_uuid_map";

/// Content type assigned to legacy identifier map files.
pub const LEGACY_MAP_CONTENT_TYPE: &str = "-MAP-";

/// Maximum allowed file name length.
pub const MAX_FILE_NAME_LENGTH: usize = 128;

/// Maximum length of the content type and content sub-type tokens.
pub const MAX_PART_LENGTH: usize = 48;

/// Number of underscore-separated parts in a conforming file name.
pub const PART_COUNT: usize = 5;

static FILE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^[a-z0-9\-_]+\.[a-z0-9]{1,4}$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid file name regex: {err}"),
    }
});

static FILE_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^(z|x)?(sct|der|res|tls|doc)(1|2)?$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid file type regex: {err}"),
    }
});

static CONTENT_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^(Concept|Description|Relationship|Identifier|[csi]+Refset)$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid content type regex: {err}"),
    }
});

static RELEASE_SUB_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^.*(Full|Snapshot|Delta)(-[a-z]{2}(-[A-Z]{2})?)?$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid release sub-type regex: {err}"),
    }
});

static DOCUMENT_SUB_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^.*(Current|Draft|Review)(-[a-z]{2}(-[A-Z]{2})?)?$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid document sub-type regex: {err}"),
    }
});

static LOCALE_SUB_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^[A-Za-z0-9]*-[a-z]{2}(-[A-Z]{2})?$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid locale sub-type regex: {err}"),
    }
});

static COUNTRY_NAMESPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^(INT|[A-Z]{2})?([0-9]{7})?$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid country/namespace regex: {err}"),
    }
});

static VERSION_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^[0-9]{8}$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid version date regex: {err}"),
    }
});

static TOKEN_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^[A-Za-z0-9]+$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid token charset regex: {err}"),
    }
});

static SUB_TYPE_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^[A-Za-z0-9]+(-[a-z]{2}(-[A-Z]{2})?)?$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid sub-type charset regex: {err}"),
    }
});

/// The five positional roles of a release file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilePart {
    /// Part 1, e.g. `sct2`, `xder2`, `res1`.
    FileType,
    /// Part 2, e.g. `Concept`, `cRefset`.
    ContentType,
    /// Part 3, e.g. `Snapshot`, `LanguageFull-en-US`.
    ContentSubType,
    /// Part 4, e.g. `INT`, `US1000161`.
    CountryNamespace,
    /// Part 5, an 8-digit date.
    VersionDate,
}

impl FilePart {
    /// All parts in file name order.
    pub const ALL: [Self; PART_COUNT] = [
        Self::FileType,
        Self::ContentType,
        Self::ContentSubType,
        Self::CountryNamespace,
        Self::VersionDate,
    ];

    /// 1-based position of this part in a conforming file name.
    #[must_use]
    pub fn number(self) -> usize {
        match self {
            Self::FileType => 1,
            Self::ContentType => 2,
            Self::ContentSubType => 3,
            Self::CountryNamespace => 4,
            Self::VersionDate => 5,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::FileType => "File type",
            Self::ContentType => "ContentType",
            Self::ContentSubType => "ContentSubType",
            Self::CountryNamespace => "Country|Namespace",
            Self::VersionDate => "VersionDate",
        }
    }
}

impl fmt::Display for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Release slice named by the content sub-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReleaseState {
    /// Changes since the previous release.
    Delta,
    /// Current state of every component.
    Snapshot,
    /// Every state of every component.
    Full,
}

impl ReleaseState {
    /// Find the release state named anywhere in `name`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.contains("Delta") {
            Some(Self::Delta)
        } else if name.contains("Snapshot") {
            Some(Self::Snapshot)
        } else if name.contains("Full") {
            Some(Self::Full)
        } else {
            None
        }
    }
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Delta => "Delta",
            Self::Snapshot => "Snapshot",
            Self::Full => "Full",
        };
        f.write_str(name)
    }
}

/// Errors from [`FileNameInfoBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileNameError {
    /// A write-once field was assigned twice.
    #[error("{field} is already set")]
    AlreadySet {
        /// Name of the field.
        field: &'static str,
    },
}

/// Strip the optional `x`/`z` prefix and any release digit from a file type
/// token, leaving the three-letter code (`sct2` → `sct`, `xder1` → `der`).
#[must_use]
pub fn file_type_code(file_type: &str) -> &str {
    let code = file_type
        .strip_prefix('x')
        .or_else(|| file_type.strip_prefix('z'))
        .unwrap_or(file_type);
    code.get(..3).unwrap_or(code)
}

/// Information decoded from a release file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileNameInfo {
    file_type: Option<String>,
    content_type: Option<String>,
    content_sub_type: Option<String>,
    country_namespace: Option<String>,
    version_date: Option<String>,
    extension: Option<String>,
    is_uuid_variant: bool,
}

impl FileNameInfo {
    /// Part 1, if identified.
    #[must_use]
    pub fn file_type(&self) -> Option<&str> {
        self.file_type.as_deref()
    }

    /// Three-letter code of the file type (`sct`, `der`, `res`, `tls`, `doc`).
    #[must_use]
    pub fn file_type_code(&self) -> Option<&str> {
        self.file_type.as_deref().map(file_type_code)
    }

    /// Part 2, if identified.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Part 3, if identified.
    #[must_use]
    pub fn content_sub_type(&self) -> Option<&str> {
        self.content_sub_type.as_deref()
    }

    /// Part 4, if identified.
    #[must_use]
    pub fn country_namespace(&self) -> Option<&str> {
        self.country_namespace.as_deref()
    }

    /// Part 5, if identified.
    #[must_use]
    pub fn version_date(&self) -> Option<&str> {
        self.version_date.as_deref()
    }

    /// Lowercase extension without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Whether the file uses UUIDs in place of SCTIDs.
    #[must_use]
    pub fn is_uuid_variant(&self) -> bool {
        self.is_uuid_variant
    }

    /// The value of one positional part.
    #[must_use]
    pub fn part(&self, part: FilePart) -> Option<&str> {
        match part {
            FilePart::FileType => self.file_type(),
            FilePart::ContentType => self.content_type(),
            FilePart::ContentSubType => self.content_sub_type(),
            FilePart::CountryNamespace => self.country_namespace(),
            FilePart::VersionDate => self.version_date(),
        }
    }

    /// Release state named by the content sub-type.
    #[must_use]
    pub fn release_state(&self) -> Option<ReleaseState> {
        self.content_sub_type().and_then(ReleaseState::from_name)
    }

    /// Whether this file carries tab-delimited content that should be
    /// checked against a column schema.
    #[must_use]
    pub fn is_delimited_text(&self) -> bool {
        self.extension() == Some("txt")
    }
}

/// Write-once builder for [`FileNameInfo`].
#[derive(Debug, Default)]
pub struct FileNameInfoBuilder {
    info: FileNameInfo,
}

impl FileNameInfoBuilder {
    /// Assign a positional part.
    ///
    /// # Errors
    /// Returns [`FileNameError::AlreadySet`] if the part was already assigned.
    pub fn set_part(&mut self, part: FilePart, value: &str) -> Result<(), FileNameError> {
        let slot = match part {
            FilePart::FileType => &mut self.info.file_type,
            FilePart::ContentType => &mut self.info.content_type,
            FilePart::ContentSubType => &mut self.info.content_sub_type,
            FilePart::CountryNamespace => &mut self.info.country_namespace,
            FilePart::VersionDate => &mut self.info.version_date,
        };
        set_once(slot, value, part.label())
    }

    /// Assign the extension (stored lowercase).
    ///
    /// # Errors
    /// Returns [`FileNameError::AlreadySet`] if the extension was already assigned.
    pub fn set_extension(&mut self, extension: &str) -> Result<(), FileNameError> {
        set_once(
            &mut self.info.extension,
            &extension.to_ascii_lowercase(),
            "Extension",
        )
    }

    /// Mark the file as the UUID variant.
    pub fn set_uuid_variant(&mut self, is_uuid_variant: bool) {
        self.info.is_uuid_variant = is_uuid_variant;
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> FileNameInfo {
        self.info
    }
}

fn set_once(
    slot: &mut Option<String>,
    value: &str,
    field: &'static str,
) -> Result<(), FileNameError> {
    if slot.is_some() {
        return Err(FileNameError::AlreadySet { field });
    }
    *slot = Some(value.to_owned());
    Ok(())
}

/// Result of classifying one file name.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Decoded name parts.
    pub info: FileNameInfo,
    /// Naming errors, in discovery order.
    pub errors: Vec<ValidationError>,
}

impl Classification {
    /// Whether the name conforms to the naming convention.
    #[must_use]
    pub fn is_conformant(&self) -> bool {
        self.errors.is_empty()
    }
}

/// What a single token was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenMatch {
    Part(FilePart),
    /// `StatedRelationship` outside a `res` file: accepted as content type, but flagged.
    StatedRelationship,
    Unknown,
}

fn naming(message: impl Into<String>) -> ValidationError {
    ValidationError::file(ErrorKind::Naming, message)
}

/// Classify a release file name (no directory component).
///
/// Never fails: every problem is reported in [`Classification::errors`] and
/// whatever could be identified is kept in [`Classification::info`].
#[must_use]
pub fn classify_file_name(file_name: &str) -> Classification {
    let mut builder = FileNameInfoBuilder::default();
    let mut errors = Vec::new();

    if file_name.starts_with(LEGACY_MAP_PREFIX) {
        errors.push(naming(
            "sct2_to_uuid_map files don't yet align to TIG naming conventions",
        ));
        record(
            builder.set_part(FilePart::ContentType, LEGACY_MAP_CONTENT_TYPE),
            &mut errors,
        );
        if let Some((_, extension)) = file_name.rsplit_once('.') {
            record(builder.set_extension(extension), &mut errors);
        }
        return Classification {
            info: builder.build(),
            errors,
        };
    }

    if !FILE_NAME_PATTERN.is_match(&file_name.to_lowercase()) {
        errors.push(naming(format!(
            "Illegal file name '{file_name}' - expected name parts of [A-Za-z0-9-_] \
             followed by a 1 to 4 character extension"
        )));
        return Classification {
            info: builder.build(),
            errors,
        };
    }

    if file_name.len() > MAX_FILE_NAME_LENGTH {
        errors.push(naming(format!(
            "Max file name length should be {MAX_FILE_NAME_LENGTH} characters - this file is {}",
            file_name.len()
        )));
        return Classification {
            info: builder.build(),
            errors,
        };
    }

    builder.set_uuid_variant(file_name.contains("UUID"));

    // The name pattern guarantees exactly one '.'.
    let (stem, extension) = file_name.rsplit_once('.').unwrap_or((file_name, ""));
    record(builder.set_extension(extension), &mut errors);

    let tokens = split_parts(stem, &mut errors);

    // Sub-type rules depend on the file type code, wherever that token sits.
    let type_code = tokens
        .iter()
        .find(|token| FILE_TYPE_PATTERN.is_match(token))
        .map(|token| file_type_code(token).to_owned());

    let mut found = [false; PART_COUNT];
    for (index, token) in tokens.iter().enumerate() {
        let position = index + 1;
        if let Some(part) = classify_token(
            token,
            position,
            type_code.as_deref(),
            &mut builder,
            &mut errors,
        ) {
            found[part.number() - 1] = true;
        }
    }

    for part in FilePart::ALL {
        if !found[part.number() - 1] {
            errors.push(naming(format!("Didn't find part number {}", part.number())));
        }
    }

    Classification {
        info: builder.build(),
        errors,
    }
}

/// Split the stem on `_`, reporting a wrong part count.
fn split_parts(stem: &str, errors: &mut Vec<ValidationError>) -> Vec<String> {
    let mut tokens: Vec<String> = stem.split('_').map(str::to_owned).collect();
    if tokens.len() != PART_COUNT {
        errors.push(naming(format!(
            "Invalid number of elements in the file name.  Expected {PART_COUNT}, had {}",
            tokens.len()
        )));

        // Intermediate exports separate the UUID marker with its own underscore.
        if tokens.len() > PART_COUNT && stem.contains("UUID_") {
            tokens = stem
                .replace("UUID_", "UUID")
                .split('_')
                .map(str::to_owned)
                .collect();
        }
    }
    tokens
}

/// Classify one token, record it in the builder and report any problems.
/// Returns the part the token was recognised as.
fn classify_token(
    token: &str,
    position: usize,
    type_code: Option<&str>,
    builder: &mut FileNameInfoBuilder,
    errors: &mut Vec<ValidationError>,
) -> Option<FilePart> {
    if token.trim().is_empty() {
        errors.push(naming(format!(
            "All {PART_COUNT} elements of the file name are required.  Part {position} is missing"
        )));
        return None;
    }

    let part = match match_token(token, position, type_code) {
        TokenMatch::Part(part) => {
            check_part_content(part, token, errors);
            Some(part)
        }
        TokenMatch::StatedRelationship => {
            errors.push(naming(
                "The specification for part 2 doesn't allow 'StatedRelationship' \
                 when the type of part 1 is not 'res'",
            ));
            Some(FilePart::ContentType)
        }
        TokenMatch::Unknown => {
            errors.push(naming(format!("Unknown part: {token}")));
            None
        }
    };

    if let Some(part) = part {
        record(builder.set_part(part, token), errors);
        if part.number() != position {
            errors.push(naming(format!(
                "Part passed in as part {position} actually validates as part {}",
                part.number()
            )));
        }
    }

    let charset = if part == Some(FilePart::ContentSubType) {
        &*SUB_TYPE_CHARSET
    } else {
        &*TOKEN_CHARSET
    };
    if !charset.is_match(token) {
        errors.push(naming(format!(
            "The filename contains illegal characters in part {position} '{token}'"
        )));
    }

    part
}

/// Apply the classification rules in priority order.
fn match_token(token: &str, position: usize, type_code: Option<&str>) -> TokenMatch {
    if FILE_TYPE_PATTERN.is_match(token) {
        return TokenMatch::Part(FilePart::FileType);
    }

    if CONTENT_TYPE_PATTERN.is_match(token) || (type_code == Some("res") && position == 2) {
        return TokenMatch::Part(FilePart::ContentType);
    }

    let is_sub_type = match type_code {
        Some("sct" | "der" | "res") => RELEASE_SUB_TYPE_PATTERN.is_match(token),
        Some("doc") => DOCUMENT_SUB_TYPE_PATTERN.is_match(token),
        Some("tls") => {
            DOCUMENT_SUB_TYPE_PATTERN.is_match(token) || LOCALE_SUB_TYPE_PATTERN.is_match(token)
        }
        _ => false,
    };
    if is_sub_type {
        return TokenMatch::Part(FilePart::ContentSubType);
    }

    if COUNTRY_NAMESPACE_PATTERN.is_match(token) {
        return TokenMatch::Part(FilePart::CountryNamespace);
    }

    if VERSION_DATE_PATTERN.is_match(token) {
        return TokenMatch::Part(FilePart::VersionDate);
    }

    if type_code != Some("res") && token == "StatedRelationship" {
        return TokenMatch::StatedRelationship;
    }

    TokenMatch::Unknown
}

/// Part-specific content rules beyond the pattern that identified the token.
fn check_part_content(part: FilePart, token: &str, errors: &mut Vec<ValidationError>) {
    match part {
        FilePart::FileType => {
            if matches!(file_type_code(token), "sct" | "der")
                && !token.ends_with(['1', '2'])
            {
                errors.push(naming(
                    "File types of sct and der must have a part 1 that ends with '1' or '2'.",
                ));
            }
        }
        FilePart::ContentType | FilePart::ContentSubType => {
            let length = token.chars().count();
            if length > MAX_PART_LENGTH {
                let which = if part == FilePart::ContentType {
                    "two"
                } else {
                    "three"
                };
                errors.push(naming(format!(
                    "Part {which} only allows {MAX_PART_LENGTH} characters - this one is \
                     {length} long. - '{token}'"
                )));
            }
        }
        FilePart::CountryNamespace | FilePart::VersionDate => {}
    }
}

/// Record a builder error as a naming error.
fn record(result: Result<(), FileNameError>, errors: &mut Vec<ValidationError>) {
    if let Err(e) = result {
        errors.push(naming(format!(
            "Parts of the filename were invalid, and could not be identified correctly: {e}"
        )));
    }
}
