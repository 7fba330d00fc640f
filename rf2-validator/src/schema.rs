//! Column schemas per content type.
//!
//! Each content type named in part 2 of a file name maps to an ordered list of
//! columns. UUID-variant files carry UUIDs in place of identifiers, so the
//! schema is built for one variant at a time.

use crate::error::{ErrorKind, ValidationError};
use crate::filename::{FileNameInfo, LEGACY_MAP_CONTENT_TYPE};
use crate::value::DataType;

/// Number of columns shared by every Refset before the extension tail.
pub const REFSET_BASE_COLUMNS: usize = 6;

/// What the header cell of a column must say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedHeader {
    /// The header must equal this name exactly.
    Named(&'static str),
    /// Refset extension column: any header is accepted.
    Any,
}

impl ExpectedHeader {
    /// The expected name, or an empty string for a wildcard.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Named(name) => name,
            Self::Any => "",
        }
    }
}

/// One column of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub data_type: DataType,
    pub header: ExpectedHeader,
}

/// Ordered column definitions for one content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    content_type: String,
    columns: Vec<ColumnSpec>,
}

impl ColumnSchema {
    /// Content type this schema was built for.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Index of the column with this header name.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| matches!(c.header, ExpectedHeader::Named(n) if n == name))
    }

    /// Whether this schema has a Refset extension tail.
    #[must_use]
    pub fn is_refset(&self) -> bool {
        self.content_type.ends_with("Refset")
    }
}

/// Outcome of resolving the schema for a file.
#[derive(Debug, Clone)]
pub struct SchemaResolution {
    /// `None` when the content type is unknown; rows cannot be validated.
    pub schema: Option<ColumnSchema>,
    /// Problems found while building the schema.
    pub errors: Vec<ValidationError>,
}

/// Incremental schema builder that applies the UUID-variant substitutions.
struct Columns {
    uuid: bool,
    columns: Vec<ColumnSpec>,
}

impl Columns {
    fn new(uuid: bool) -> Self {
        Self {
            uuid,
            columns: Vec::new(),
        }
    }

    fn push(mut self, data_type: DataType, header: ExpectedHeader) -> Self {
        self.columns.push(ColumnSpec { data_type, header });
        self
    }

    fn column(self, name: &'static str, data_type: DataType) -> Self {
        self.push(data_type, ExpectedHeader::Named(name))
    }

    /// Identifier column; UUID in the UUID variant.
    fn id(self, name: &'static str) -> Self {
        let data_type = self.id_type();
        self.column(name, data_type)
    }

    /// `active` flag; UUID in the UUID variant.
    fn active(self) -> Self {
        let data_type = if self.uuid {
            DataType::Uuid
        } else {
            DataType::Boolean
        };
        self.column("active", data_type)
    }

    /// Identifier column that becomes a `true`/`false` flag in the UUID variant.
    fn flag(self, name: &'static str) -> Self {
        let data_type = if self.uuid {
            DataType::UuidBoolean
        } else {
            DataType::Identifier
        };
        self.column(name, data_type)
    }

    fn effective_time(self) -> Self {
        self.column("effectiveTime", DataType::Time)
    }

    fn id_type(&self) -> DataType {
        if self.uuid {
            DataType::Uuid
        } else {
            DataType::Identifier
        }
    }

    fn build(self, content_type: &str) -> ColumnSchema {
        ColumnSchema {
            content_type: content_type.to_owned(),
            columns: self.columns,
        }
    }
}

/// Look up the column schema for a classified file.
#[must_use]
pub fn resolve_schema(info: &FileNameInfo) -> SchemaResolution {
    let Some(content_type) = info.content_type() else {
        return SchemaResolution {
            schema: None,
            errors: vec![ValidationError::file(
                ErrorKind::UnknownContentType,
                "Unknown content type (due to invalid file naming), can't validate file",
            )],
        };
    };

    let mut errors = Vec::new();
    let columns = Columns::new(info.is_uuid_variant());
    let columns = match content_type {
        "Concept" => Some(
            columns
                .id("id")
                .effective_time()
                .active()
                .id("moduleId")
                .flag("definitionStatusId"),
        ),
        "Description" => Some(
            columns
                .id("id")
                .effective_time()
                .active()
                .id("moduleId")
                .id("conceptId")
                .column("languageCode", DataType::String)
                .id("typeId")
                .column("term", DataType::String)
                .flag("caseSignificanceId"),
        ),
        "Relationship" | "StatedRelationship" => Some(
            columns
                .id("id")
                .effective_time()
                .active()
                .id("moduleId")
                .id("sourceId")
                .id("destinationId")
                .column("relationshipGroup", DataType::Integer)
                .id("typeId")
                .id("characteristicTypeId")
                .id("modifierId"),
        ),
        "Identifier" => Some(
            columns
                .id("identifierSchemeId")
                .column("alternateIdentifier", DataType::String)
                .effective_time()
                .active()
                .id("moduleId")
                .id("referencedComponentId"),
        ),
        LEGACY_MAP_CONTENT_TYPE => Some(
            columns
                .column("sctId", DataType::Identifier)
                .column("uuid", DataType::Uuid),
        ),
        other => other
            .strip_suffix("Refset")
            .map(|prefix| refset_columns(columns, prefix, &mut errors)),
    };

    match columns {
        Some(columns) => SchemaResolution {
            schema: Some(columns.build(content_type)),
            errors,
        },
        None => SchemaResolution {
            schema: None,
            errors: vec![ValidationError::file(
                ErrorKind::UnknownContentType,
                format!("Content Type '{content_type}' validation is not yet implemented"),
            )],
        },
    }
}

/// Six fixed columns, then one wildcard column per prefix character.
fn refset_columns(columns: Columns, prefix: &str, errors: &mut Vec<ValidationError>) -> Columns {
    let mut columns = columns
        .column("id", DataType::Uuid)
        .effective_time()
        .active()
        .id("moduleId")
        .id("refsetId")
        .column("referencedComponentId", DataType::IdentifierOrUuid);

    for code in prefix.chars() {
        let data_type = match code {
            'c' => columns.id_type(),
            's' => DataType::String,
            'i' => DataType::Integer,
            other => {
                errors.push(ValidationError::file(
                    ErrorKind::UnknownContentType,
                    format!("Invalid extra column type '{other}'"),
                ));
                DataType::String
            }
        };
        columns = columns.push(data_type, ExpectedHeader::Any);
    }
    columns
}

/// Compare a header line against the schema.
///
/// Every column is checked; a bad name, a missing column and a surplus of
/// columns are all reported independently.
#[must_use]
pub fn check_header(schema: &ColumnSchema, header: &[&str]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, spec) in schema.columns().iter().enumerate() {
        match header.get(index) {
            None => errors.push(ValidationError::header(
                index,
                format!(
                    "Missing expected column {index} which should be '{}'",
                    spec.header.name()
                ),
            )),
            Some(actual) => {
                if let ExpectedHeader::Named(name) = spec.header
                    && name != *actual
                {
                    errors.push(ValidationError::header(
                        index,
                        format!(
                            "Column {} should be '{name}' but it is '{actual}'.",
                            index + 1
                        ),
                    ));
                }
            }
        }
    }

    if header.len() > schema.len() {
        errors.push(ValidationError::header(
            schema.len(),
            format!(
                "Too many columns - should have {}, but has {}",
                schema.len(),
                header.len()
            ),
        ));
    }

    errors
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::filename::classify_file_name;

    const CONCEPT_HEADER: [&str; 5] = [
        "id",
        "effectiveTime",
        "active",
        "moduleId",
        "definitionStatusId",
    ];

    fn schema_for(file_name: &str) -> SchemaResolution {
        resolve_schema(&classify_file_name(file_name).info)
    }

    fn types(schema: &ColumnSchema) -> Vec<DataType> {
        schema.columns().iter().map(|c| c.data_type).collect()
    }

    // ---- resolve_schema ----

    #[test]
    fn test_concept_schema() {
        let resolved = schema_for("sct2_Concept_Snapshot_INT_20130731.txt");
        assert!(resolved.errors.is_empty());
        let schema = resolved.schema.unwrap();
        assert_eq!(schema.content_type(), "Concept");
        assert_eq!(
            types(&schema),
            vec![
                DataType::Identifier,
                DataType::Time,
                DataType::Boolean,
                DataType::Identifier,
                DataType::Identifier,
            ]
        );
        assert_eq!(schema.position("effectiveTime"), Some(1));
        assert!(!schema.is_refset());
    }

    #[test]
    fn test_position_matches_named_columns_only() {
        let schema = schema_for("der2_cRefset_AttributeValueSnapshot_INT_20130731.txt")
            .schema
            .unwrap();
        let owned = String::from("moduleId");
        assert_eq!(schema.position(&owned), Some(3));
        assert_eq!(schema.position("referencedComponentId"), Some(5));
        assert_eq!(schema.position("valueId"), None);
        assert_eq!(schema.position("missing"), None);
    }

    #[test]
    fn test_concept_uuid_variant() {
        let schema = schema_for("sct2_ConceptUUID_Snapshot_INT_20130731.txt");
        // "ConceptUUID" is not a known content type
        assert!(schema.schema.is_none());

        let schema = schema_for("sct2_Concept_UUIDSnapshot_INT_20130731.txt")
            .schema
            .unwrap();
        assert_eq!(
            types(&schema),
            vec![
                DataType::Uuid,
                DataType::Time,
                DataType::Uuid,
                DataType::Uuid,
                DataType::UuidBoolean,
            ]
        );
    }

    #[test]
    fn test_description_schema() {
        let schema = schema_for("sct2_Description_Full-en_INT_20130731.txt")
            .schema
            .unwrap();
        assert_eq!(schema.len(), 9);
        assert_eq!(schema.columns()[5].header, ExpectedHeader::Named("languageCode"));
        assert_eq!(schema.columns()[7].data_type, DataType::String);
    }

    #[test]
    fn test_stated_relationship_uses_relationship_schema() {
        let stated = schema_for("sct2_StatedRelationship_Snapshot_INT_20130731.txt")
            .schema
            .unwrap();
        let plain = schema_for("sct2_Relationship_Snapshot_INT_20130731.txt")
            .schema
            .unwrap();
        assert_eq!(stated.columns(), plain.columns());
        assert_eq!(stated.columns()[6].data_type, DataType::Integer);
    }

    #[test]
    fn test_refset_tail() {
        let schema = schema_for("der2_cisRefset_SimpleSnapshot_INT_20130731.txt")
            .schema
            .unwrap();
        assert!(schema.is_refset());
        assert_eq!(schema.len(), REFSET_BASE_COLUMNS + 3);
        assert_eq!(schema.columns()[0].data_type, DataType::Uuid);
        assert_eq!(schema.columns()[5].data_type, DataType::IdentifierOrUuid);
        assert_eq!(
            &types(&schema)[REFSET_BASE_COLUMNS..],
            &[DataType::Identifier, DataType::Integer, DataType::String]
        );
        assert!(
            schema.columns()[REFSET_BASE_COLUMNS..]
                .iter()
                .all(|c| c.header == ExpectedHeader::Any)
        );
    }

    #[test]
    fn test_refset_invalid_extra_column() {
        let resolved = schema_for("xres2_xRefset_Full_INT_20130731.txt");
        assert_eq!(resolved.errors.len(), 1);
        assert_eq!(resolved.errors[0].message, "Invalid extra column type 'x'");
        let schema = resolved.schema.unwrap();
        assert_eq!(schema.columns()[REFSET_BASE_COLUMNS].data_type, DataType::String);
    }

    #[test]
    fn test_legacy_map_schema() {
        let schema = schema_for("sct2_to_uuid_map_Full_20130731.txt")
            .schema
            .unwrap();
        assert_eq!(types(&schema), vec![DataType::Identifier, DataType::Uuid]);
    }

    #[test]
    fn test_unknown_content_type() {
        let resolved = schema_for("xres2_Workbench_Full_INT_20130731.txt");
        assert!(resolved.schema.is_none());
        assert_eq!(resolved.errors.len(), 1);
        assert_eq!(
            resolved.errors[0].message,
            "Content Type 'Workbench' validation is not yet implemented"
        );
        assert_eq!(resolved.errors[0].kind, ErrorKind::UnknownContentType);
    }

    #[test]
    fn test_missing_content_type() {
        let resolved = resolve_schema(&FileNameInfo::default());
        assert!(resolved.schema.is_none());
        assert!(resolved.errors[0].message.starts_with("Unknown content type"));
    }

    // ---- check_header ----

    fn concept_schema() -> ColumnSchema {
        schema_for("sct2_Concept_Snapshot_INT_20130731.txt")
            .schema
            .unwrap()
    }

    #[test]
    fn test_header_matches() {
        assert!(check_header(&concept_schema(), &CONCEPT_HEADER).is_empty());
    }

    #[test]
    fn test_header_wrong_case() {
        let mut header = CONCEPT_HEADER;
        header[3] = "moduleID";
        let errors = check_header(&concept_schema(), &header);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "Column 4 should be 'moduleId' but it is 'moduleID'."
        );
        assert_eq!(errors[0].column, Some(3));
    }

    #[test]
    fn test_header_too_many_columns() {
        let mut header = CONCEPT_HEADER.to_vec();
        header.push("extra");
        let errors = check_header(&concept_schema(), &header);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Too many columns - should have 5, but has 6");
    }

    #[test]
    fn test_header_missing_columns() {
        let errors = check_header(&concept_schema(), &CONCEPT_HEADER[..3]);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].message,
            "Missing expected column 3 which should be 'moduleId'"
        );
        assert_eq!(
            errors[1].message,
            "Missing expected column 4 which should be 'definitionStatusId'"
        );
    }

    #[test]
    fn test_header_mismatch_and_surplus_both_reported() {
        let header = ["id", "effectiveTime", "Active", "moduleId", "definitionStatusId", "x"];
        let errors = check_header(&concept_schema(), &header);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.starts_with("Column 3 should be 'active'"));
        assert!(errors[1].message.starts_with("Too many columns"));
    }

    #[test]
    fn test_refset_extension_headers_are_free() {
        let schema = schema_for("der2_cRefset_AssociationSnapshot_INT_20130731.txt")
            .schema
            .unwrap();
        let header = [
            "id",
            "effectiveTime",
            "active",
            "moduleId",
            "refsetId",
            "referencedComponentId",
            "targetComponentId",
        ];
        assert!(check_header(&schema, &header).is_empty());

        let errors = check_header(&schema, &header[..6]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Missing expected column 6 which should be ''");
    }
}
