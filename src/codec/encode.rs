//! Record → flow document encoding.
//!
//! The document is a literal assignment of the record's non-extracted
//! fields, followed by one backtick-literal block per non-empty text field
//! and one function block per non-empty script field, then a fixed trailer.
//! Extracted fields are blanked in the literal, not removed, so key
//! presence and order survive edits to the extracted blocks.

use serde_json::Value;

use crate::codec::{escape_text, FUNC_INDENT, NODE_PREFIX, NODE_SUFFIX, SEPARATOR, STORAGE_EXTENSION};
use crate::error::Result;
use crate::model::{Record, BASE_PARAMS, SCRIPT_FIELDS, TEXT_FIELDS};

/// The encoded document plus the filename it belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFile {
    /// Full document text.
    pub document: String,
    /// `sanitize(type).id.flows.js`
    pub file_name: String,
}

/// Encode one record into its flow document and filename.
///
/// # Errors
///
/// Returns [`Error::Validation`](crate::Error::Validation) when the record
/// is missing a non-empty `id` or `type`.
pub fn encode(record: &Record) -> Result<EncodedFile> {
    record.validate()?;

    let mut params: Vec<&str> = BASE_PARAMS.to_vec();
    let lib_vars = record.lib_vars();
    params.extend(lib_vars.iter().map(String::as_str));

    let mut head = record.clone();
    let mut extracted: Vec<String> = Vec::new();

    for field in TEXT_FIELDS {
        if let Some(text) = non_empty_str(&head, field) {
            extracted.push(format!("Node.{field} = `\n{}\n`", escape_text(&text)));
            head.insert(field, Value::String(String::new()));
        }
    }

    for field in SCRIPT_FIELDS {
        if let Some(body) = non_empty_str(&head, field) {
            extracted.push(format!(
                "Node.{field} = async function ({}) {{\n{}\n}}",
                params.join(", "),
                indent(&body)
            ));
            head.insert(field, Value::String(String::new()));
        }
    }

    let mut document = String::from(NODE_PREFIX);
    document.push_str(&serde_json::to_string_pretty(head.as_map())?);
    if !extracted.is_empty() {
        document.push_str(SEPARATOR);
        document.push_str(&extracted.join(SEPARATOR));
    }
    document.push_str(SEPARATOR);
    document.push_str(NODE_SUFFIX);

    let id = record.id().unwrap_or_default();
    let node_type = record.node_type().unwrap_or_default();
    let file_name = format!("{}.{id}{STORAGE_EXTENSION}", sanitize_type(node_type));

    Ok(EncodedFile {
        document,
        file_name,
    })
}

/// Filesystem-safe rendering of a record type: lowercased, with every
/// character outside `[a-z0-9]` replaced by `_`. Idempotent.
#[must_use]
pub fn sanitize_type(node_type: &str) -> String {
    node_type
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn non_empty_str(record: &Record, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Indent every line of a script body by one indent unit.
fn indent(code: &str) -> String {
    code.split('\n')
        .map(|line| format!("{FUNC_INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => Record::from_map(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_function_block_wraps_indented_body() {
        let rec = record(json!({
            "id": "c0bd346c54d153d9",
            "type": "function",
            "func": "return msg;",
            "initialize": "console.log('int')"
        }));
        let encoded = encode(&rec).unwrap();

        assert!(encoded.document.contains(
            "Node.func = async function (node, msg, RED, context, flow, global, env, util) {\n  return msg;\n}"
        ));
        assert!(encoded.document.contains(
            "Node.initialize = async function (node, msg, RED, context, flow, global, env, util) {\n  console.log('int')\n}"
        ));
        assert_eq!(encoded.file_name, "function.c0bd346c54d153d9.flows.js");
    }

    #[test]
    fn test_lib_vars_extend_parameter_list() {
        let rec = record(json!({
            "id": "c0bd346c54d153d9",
            "type": "function",
            "func": "return msg;",
            "libs": [{"var": "moment", "module": "moment"}]
        }));
        let encoded = encode(&rec).unwrap();
        assert!(encoded.document.contains(
            "async function (node, msg, RED, context, flow, global, env, util, moment) {"
        ));
    }

    #[test]
    fn test_extracted_fields_are_blanked_not_removed() {
        let rec = record(json!({
            "id": "a1",
            "type": "function",
            "info": "notes",
            "func": "return msg;",
            "x": 100
        }));
        let encoded = encode(&rec).unwrap();

        // The head keeps both keys, blanked, at their original positions.
        assert!(encoded.document.contains("\"info\": \"\""));
        assert!(encoded.document.contains("\"func\": \"\""));
        let info_at = encoded.document.find("\"info\"").unwrap();
        let func_at = encoded.document.find("\"func\"").unwrap();
        let x_at = encoded.document.find("\"x\"").unwrap();
        assert!(info_at < func_at && func_at < x_at);
    }

    #[test]
    fn test_empty_optional_fields_contribute_no_block() {
        let rec = record(json!({
            "id": "a1",
            "type": "function",
            "info": "",
            "func": ""
        }));
        let encoded = encode(&rec).unwrap();
        assert!(!encoded.document.contains("Node.info"));
        assert!(!encoded.document.contains("Node.func ="));
        assert!(encoded.document.ends_with("module.exports = Node;"));
    }

    #[test]
    fn test_missing_required_fields_fail_validation() {
        let no_id = record(json!({"type": "function"}));
        assert!(matches!(encode(&no_id), Err(Error::Validation(_))));

        let empty_id = record(json!({"id": "", "type": "function"}));
        assert!(matches!(encode(&empty_id), Err(Error::Validation(_))));
    }

    #[test]
    fn test_sanitize_type() {
        assert_eq!(sanitize_type("function"), "function");
        assert_eq!(sanitize_type("HTTP Request"), "http_request");
        assert_eq!(sanitize_type("ui_chart (v2)"), "ui_chart__v2_");
        assert_eq!(sanitize_type("héllo"), "h_llo");
    }

    #[test]
    fn test_sanitize_type_is_idempotent() {
        for t in ["function", "HTTP Request", "a-b.c", "ÄÖÜ"] {
            let once = sanitize_type(t);
            assert_eq!(sanitize_type(&once), once);
            assert!(once.chars().all(|c| c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || c == '_'));
        }
    }
}
