//! Parsing of the JSON field schema returned by a plugin's `get_fields`.
//!
//! The schema is an array of records:
//!
//! ```json
//! [{"name": "proc.name", "type": "string", "desc": "process name"}]
//! ```
//!
//! The output keeps the input order: filter checks refer to fields by
//! position, so the index of a record is part of the plugin's contract.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::SchemaError;
use crate::field_info::{FieldInfo, FieldType};

#[derive(Debug, Deserialize)]
struct RawField {
    name: Option<String>,
    #[serde(rename = "type")]
    field_type: Option<String>,
    desc: Option<String>,
}

/// Parses a schema document into field descriptors.
///
/// Fails without producing a partial list when the document is not an array
/// of records, a record lacks a non-empty `name`, `type` or `desc`, a type is
/// not one of `string`, `integer`, `float`, or a name repeats.
pub fn parse_fields(schema: &str) -> Result<Vec<FieldInfo>, SchemaError> {
    let raw: Vec<RawField> = serde_json::from_str(schema).map_err(SchemaError::InvalidJson)?;
    if raw.is_empty() {
        return Err(SchemaError::Empty);
    }

    let mut fields = Vec::with_capacity(raw.len());
    let mut seen = HashSet::new();

    for (index, entry) in raw.into_iter().enumerate() {
        let name = required(entry.name, index, "name")?;
        let type_name = required(entry.field_type, index, "type")?;
        let desc = required(entry.desc, index, "desc")?;

        let field_type = FieldType::from_schema(&type_name).ok_or(SchemaError::InvalidType {
            index,
            field_type: type_name,
        })?;

        // Compared before truncation: distinct names may share a bounded prefix.
        if !seen.insert(name.clone()) {
            return Err(SchemaError::DuplicateField { index, name });
        }

        fields.push(FieldInfo::new(&name, &desc, field_type));
    }

    Ok(fields)
}

fn required(value: Option<String>, index: usize, attribute: &'static str) -> Result<String, SchemaError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SchemaError::MissingAttribute { index, attribute }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_info::PrintFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_string_field() {
        let fields = parse_fields(r#"[{"name":"proc.name","type":"string","desc":"process name"}]"#).unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name(), "proc.name");
        assert_eq!(fields[0].description(), "process name");
        assert_eq!(fields[0].field_type(), FieldType::String);
        assert_eq!(fields[0].print_format(), PrintFormat::Dec);
    }

    #[test]
    fn keeps_declaration_order_and_maps_types() {
        let fields = parse_fields(
            r#"[
                {"name":"c","type":"float","desc":"third letter"},
                {"name":"a","type":"string","desc":"first letter"},
                {"name":"b","type":"integer","desc":"second letter"}
            ]"#,
        )
        .unwrap();

        let summary: Vec<(&str, FieldType)> = fields.iter().map(|f| (f.name(), f.field_type())).collect();
        assert_eq!(
            summary,
            vec![("c", FieldType::Float), ("a", FieldType::String), ("b", FieldType::Integer)]
        );
    }

    #[test]
    fn extra_attributes_are_ignored() {
        let fields = parse_fields(r#"[{"name":"x","type":"string","desc":"d","display":"X"}]"#).unwrap();
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn rejects_unknown_type() {
        let err = parse_fields(r#"[{"name":"x","type":"bool","desc":"d"}]"#).unwrap_err();
        match err {
            SchemaError::InvalidType { index, field_type } => {
                assert_eq!(index, 0);
                assert_eq!(field_type, "bool");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_missing_or_empty_attributes() {
        let cases = [
            (r#"[{"type":"string","desc":"d"}]"#, "name"),
            (r#"[{"name":"","type":"string","desc":"d"}]"#, "name"),
            (r#"[{"name":"x","desc":"d"}]"#, "type"),
            (r#"[{"name":"x","type":"","desc":"d"}]"#, "type"),
            (r#"[{"name":"x","type":"string"}]"#, "desc"),
            (r#"[{"name":"x","type":"string","desc":""}]"#, "desc"),
        ];

        for (schema, expected) in cases {
            match parse_fields(schema) {
                Err(SchemaError::MissingAttribute { attribute, .. }) => assert_eq!(attribute, expected, "{schema}"),
                other => panic!("{schema}: unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn error_in_later_record_reports_its_index() {
        let err = parse_fields(
            r#"[{"name":"a","type":"string","desc":"d"},{"name":"b","type":"string"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingAttribute { index: 1, attribute: "desc" }));
    }

    #[test]
    fn rejects_non_array_and_non_string_attributes() {
        assert!(matches!(parse_fields("not json"), Err(SchemaError::InvalidJson(_))));
        assert!(matches!(
            parse_fields(r#"{"name":"x","type":"string","desc":"d"}"#),
            Err(SchemaError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_fields(r#"[{"name":7,"type":"string","desc":"d"}]"#),
            Err(SchemaError::InvalidJson(_))
        ));
    }

    #[test]
    fn rejects_empty_schema() {
        assert!(matches!(parse_fields("[]"), Err(SchemaError::Empty)));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = parse_fields(
            r#"[{"name":"x","type":"string","desc":"d"},{"name":"x","type":"integer","desc":"e"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { index: 1, .. }));
    }

    #[test]
    fn long_names_sharing_a_prefix_are_distinct() {
        let stem = "n".repeat(64);
        let schema = format!(
            r#"[{{"name":"{stem}A","type":"string","desc":"d"}},{{"name":"{stem}B","type":"string","desc":"d"}}]"#
        );

        let fields = parse_fields(&schema).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name(), stem);
        assert_eq!(fields[1].name(), stem);
    }

    #[test]
    fn duplicate_error_reports_full_name() {
        let long = "m".repeat(80);
        let schema = format!(
            r#"[{{"name":"{long}","type":"string","desc":"d"}},{{"name":"{long}","type":"string","desc":"d"}}]"#
        );

        match parse_fields(&schema) {
            Err(SchemaError::DuplicateField { index, name }) => {
                assert_eq!(index, 1);
                assert_eq!(name, long);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
