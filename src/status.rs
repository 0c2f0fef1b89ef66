//! Status-column label parsing.
//!
//! Status columns store their labels in `settings_str`, a JSON document of the
//! form `{"labels": {"0": "Working on it", "1": "Done", ...}}`.

use serde::Serialize;
use serde_json::Value;

use crate::{MondayError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusOption {
    pub index: u32,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusColumn {
    pub column_id: String,
    pub column_title: String,
    pub statuses: Vec<StatusOption>,
}

/// Parses the labels of a status column, sorted by index.
pub fn parse_status_labels(settings_str: &str) -> Result<Vec<StatusOption>> {
    let settings: Value = serde_json::from_str(settings_str)
        .map_err(|err| MondayError::Validation(format!("invalid column settings: {err}")))?;

    let Some(labels) = settings.get("labels").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let mut options = labels
        .iter()
        .map(|(index, label)| {
            let index = index.parse::<u32>().map_err(|_| {
                MondayError::Validation(format!("invalid status index '{index}'"))
            })?;
            let label = label.as_str().unwrap_or_default().to_owned();
            Ok(StatusOption { index, label })
        })
        .collect::<Result<Vec<_>>>()?;

    options.sort_by_key(|option| option.index);
    Ok(options)
}

/// Extracts every status column with parseable settings from a board's columns.
///
/// Columns whose settings fail to parse are skipped.
pub fn status_columns(columns: &[Value]) -> Vec<StatusColumn> {
    columns
        .iter()
        .filter(|column| column.get("type").and_then(Value::as_str) == Some("status"))
        .filter_map(|column| {
            let settings = column.get("settings_str").and_then(Value::as_str)?;
            let statuses = parse_status_labels(settings).ok()?;
            Some(StatusColumn {
                column_id: text_field(column, "id"),
                column_title: text_field(column, "title"),
                statuses,
            })
        })
        .collect()
}

/// One board column as shown by column listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub column_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Labels of a status column; absent for other column types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_options: Option<Vec<StatusOption>>,
}

/// Summarizes every column of a board, attaching labels to status columns.
pub fn summarize_columns(columns: &[Value]) -> Vec<ColumnSummary> {
    columns
        .iter()
        .map(|column| {
            let kind = text_field(column, "type");
            let status_options = if kind == "status" {
                column
                    .get("settings_str")
                    .and_then(Value::as_str)
                    .and_then(|settings| parse_status_labels(settings).ok())
            } else {
                None
            };
            ColumnSummary {
                column_id: text_field(column, "id"),
                title: text_field(column, "title"),
                kind,
                status_options,
            }
        })
        .collect()
}

/// Finds the index of `label`, compared case-insensitively.
pub fn resolve_label(options: &[StatusOption], label: &str) -> Result<u32> {
    let wanted = label.to_lowercase();
    options
        .iter()
        .find(|option| option.label.to_lowercase() == wanted)
        .map(|option| option.index)
        .ok_or_else(|| {
            let available = options
                .iter()
                .map(|option| format!("'{}'", option.label))
                .collect::<Vec<_>>()
                .join(", ");
            MondayError::Validation(format!(
                "status '{label}' not found; available statuses: {available}"
            ))
        })
}

fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_status_labels, resolve_label, status_columns, summarize_columns};
    use crate::MondayError;

    #[test]
    fn labels_are_sorted_by_index() {
        let options =
            parse_status_labels(r#"{"labels": {"2": "Stuck", "0": "Working", "1": "Done"}}"#)
                .expect("must parse");
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Working", "Done", "Stuck"]);
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let options = parse_status_labels(r#"{"labels": {"0": "In Progress", "1": "Done"}}"#)
            .expect("must parse");
        assert_eq!(resolve_label(&options, "in progress").expect("found"), 0);
        assert_eq!(resolve_label(&options, "DONE").expect("found"), 1);
    }

    #[test]
    fn unknown_label_lists_available() {
        let options = parse_status_labels(r#"{"labels": {"0": "Done"}}"#).expect("must parse");
        let err = resolve_label(&options, "Blocked").expect_err("must fail");
        match err {
            MondayError::Validation(message) => assert!(message.contains("'Done'")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn only_status_columns_with_settings_are_kept() {
        let columns = vec![
            json!({ "id": "name", "title": "Name", "type": "name", "settings_str": "{}" }),
            json!({ "id": "status", "title": "Status", "type": "status",
                    "settings_str": r#"{"labels": {"1": "Done"}}"# }),
            json!({
                "id": "broken",
                "title": "Broken",
                "type": "status",
                "settings_str": "not json"
            }),
            json!({ "id": "empty", "title": "Empty", "type": "status" }),
        ];
        let found = status_columns(&columns);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].column_id, "status");
        assert_eq!(found[0].statuses[0].index, 1);
    }

    #[test]
    fn summaries_cover_every_column() {
        let columns = vec![
            json!({ "id": "name", "title": "Name", "type": "name", "settings_str": "{}" }),
            json!({ "id": "status", "title": "Status", "type": "status",
                    "settings_str": r#"{"labels": {"1": "Done", "0": "Open"}}"# }),
        ];
        let summaries = summarize_columns(&columns);
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].status_options.is_none());

        let statuses = summaries[1].status_options.as_ref().expect("status labels");
        assert_eq!(statuses[0].label, "Open");

        let rendered = serde_json::to_value(&summaries[0]).expect("serializes");
        assert_eq!(rendered, json!({ "column_id": "name", "title": "Name", "type": "name" }));
    }
}
