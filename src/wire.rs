use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub struct GraphQLRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<&'a Value>,
}

impl<'a> GraphQLRequest<'a> {
    /// Builds a request body, omitting `variables` when null or empty.
    pub fn new(query: &'a str, variables: Option<&'a Value>) -> Self {
        let variables = variables.filter(|value| match value {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        });
        Self { query, variables }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<Value>>,
}

impl GraphQLResponse {
    /// Messages of every entry in `errors`, or the entry itself when it has none.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flatten()
            .map(|entry| match entry.get("message").and_then(Value::as_str) {
                Some(message) => message.to_owned(),
                None => entry.to_string(),
            })
            .collect()
    }

    /// The `data` object, empty when absent or null.
    pub fn into_data(self) -> Map<String, Value> {
        match self.data {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Account complexity budget reported inside `data.complexity`.
///
/// Informational only: it is logged, never used to gate calls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityBudget {
    #[serde(default)]
    pub before: Option<i64>,
    #[serde(default)]
    pub after: Option<i64>,
    #[serde(default)]
    pub query: Option<i64>,
    #[serde(default)]
    pub reset_in_x_seconds: Option<i64>,
}

impl ComplexityBudget {
    /// Extracts the budget from a `data` object, if one is present.
    pub fn from_data(data: &Map<String, Value>) -> Option<Self> {
        let value = data.get("complexity")?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ComplexityBudget, GraphQLRequest, GraphQLResponse};

    #[test]
    fn empty_variables_are_omitted() {
        let empty = json!({});
        let body = serde_json::to_value(GraphQLRequest::new("query { me { id } }", Some(&empty)))
            .expect("must serialize");
        assert_eq!(body, json!({ "query": "query { me { id } }" }));
    }

    #[test]
    fn variables_are_sent_when_present() {
        let vars = json!({ "itemIds": ["1"] });
        let body = serde_json::to_value(GraphQLRequest::new("q", Some(&vars)))
            .expect("must serialize");
        assert_eq!(body["variables"]["itemIds"][0], "1");
    }

    #[test]
    fn null_errors_and_missing_data_decode() {
        let response: GraphQLResponse =
            serde_json::from_str(r#"{"errors": null}"#).expect("must decode");
        assert!(response.error_messages().is_empty());
        assert!(response.into_data().is_empty());
    }

    #[test]
    fn error_without_message_falls_back_to_entry_text() {
        let response: GraphQLResponse =
            serde_json::from_value(json!({ "errors": [{ "code": "X" }, { "message": "m" }] }))
                .expect("must decode");
        assert_eq!(response.error_messages(), vec![r#"{"code":"X"}"#, "m"]);
    }

    #[test]
    fn complexity_is_read_from_data() {
        let data = json!({
            "complexity": { "before": 10_000_000, "after": 9_990_000, "reset_in_x_seconds": 42 }
        });
        let budget = ComplexityBudget::from_data(data.as_object().expect("object"))
            .expect("budget present");
        assert_eq!(budget.after, Some(9_990_000));
        assert_eq!(budget.query, None);
        assert_eq!(budget.reset_in_x_seconds, Some(42));
    }
}
