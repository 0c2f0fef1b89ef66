//! Doc-column helpers.
//!
//! A doc column value stores the doc's `object_id`, either as `doc_id` or in
//! the first entry of `files`. The docs API needs the internal doc id, which
//! is resolved from the object id with a separate query.

use serde_json::Value;

use crate::{MondayError, Result};

/// Content of an exported doc.
#[derive(Clone, Debug, PartialEq)]
pub enum DocContent {
    Markdown(String),
    /// Raw blocks, returned when the markdown export is not supported for the doc.
    Blocks(Value),
}

/// Finds a doc column by title, compared case-insensitively, and returns its id.
pub(crate) fn find_doc_column<'a>(columns: &'a [Value], title: &str) -> Result<&'a str> {
    let wanted = title.to_lowercase();
    let column = columns
        .iter()
        .find(|column| {
            column
                .get("title")
                .and_then(Value::as_str)
                .is_some_and(|candidate| candidate.to_lowercase() == wanted)
        })
        .ok_or_else(|| {
            let available = columns
                .iter()
                .filter_map(|column| column.get("title").and_then(Value::as_str))
                .map(|title| format!("'{title}'"))
                .collect::<Vec<_>>()
                .join(", ");
            MondayError::Validation(format!(
                "column '{title}' not found on board; available columns: {available}"
            ))
        })?;

    let kind = column.get("type").and_then(Value::as_str).unwrap_or_default();
    if kind != "doc" {
        return Err(MondayError::Validation(format!(
            "column '{title}' is not a doc column (type: {kind})"
        )));
    }
    column
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| MondayError::api(format!("column '{title}' has no id")))
}

/// Reads the doc `object_id` stored in an item's doc column, if any.
pub(crate) fn doc_object_id(item: &Value, column_id: &str) -> Option<String> {
    let column_value = item
        .get("column_values")?
        .as_array()?
        .iter()
        .find(|value| value.get("id").and_then(Value::as_str) == Some(column_id))?;
    let raw = column_value.get("value").and_then(Value::as_str)?;
    let value: Value = serde_json::from_str(raw).ok()?;

    if let Some(doc_id) = value.get("doc_id").and_then(id_text) {
        return Some(doc_id);
    }
    let file = value.get("files")?.as_array()?.first()?;
    file.get("objectId")
        .and_then(id_text)
        .or_else(|| file.get("assetId").and_then(id_text))
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{doc_object_id, find_doc_column};
    use crate::MondayError;

    fn item_with(value: &str) -> serde_json::Value {
        json!({
            "id": "1",
            "column_values": [
                { "id": "text", "value": "\"hello\"" },
                { "id": "monday_doc", "value": value }
            ]
        })
    }

    #[test]
    fn object_id_comes_from_doc_id_first() {
        let item = item_with(r#"{"doc_id": 77, "files": [{"objectId": 88}]}"#);
        assert_eq!(doc_object_id(&item, "monday_doc").as_deref(), Some("77"));
    }

    #[test]
    fn object_id_falls_back_to_first_file() {
        let item = item_with(r#"{"files": [{"objectId": "900"}, {"objectId": "901"}]}"#);
        assert_eq!(doc_object_id(&item, "monday_doc").as_deref(), Some("900"));

        let item = item_with(r#"{"files": [{"assetId": 5}]}"#);
        assert_eq!(doc_object_id(&item, "monday_doc").as_deref(), Some("5"));
    }

    #[test]
    fn empty_or_broken_column_has_no_doc() {
        assert!(doc_object_id(&item_with("not json"), "monday_doc").is_none());
        assert!(doc_object_id(&item_with(r#"{"files": []}"#), "monday_doc").is_none());
        assert!(doc_object_id(&item_with("{}"), "missing").is_none());
    }

    #[test]
    fn doc_column_is_matched_by_title_and_type() {
        let columns = vec![
            json!({ "id": "status", "title": "Status", "type": "status" }),
            json!({ "id": "monday_doc", "title": "Design Doc", "type": "doc" }),
        ];
        assert_eq!(
            find_doc_column(&columns, "design doc").expect("found"),
            "monday_doc"
        );

        match find_doc_column(&columns, "Status") {
            Err(MondayError::Validation(message)) => assert!(message.contains("not a doc column")),
            other => panic!("expected validation error, got {other:?}"),
        }
        match find_doc_column(&columns, "Notes") {
            Err(MondayError::Validation(message)) => assert!(message.contains("'Design Doc'")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
