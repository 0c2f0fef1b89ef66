//! Maps raw request outcomes onto the [`MondayError`] taxonomy.

use reqwest::StatusCode;
use serde_json::Value;

use crate::MondayError;

/// Wait suggested to callers when a 429 carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// A failed request outcome, before classification.
#[derive(Debug)]
pub enum Outcome<'a> {
    /// The request never produced a response, or its body could not be read.
    Transport(&'a reqwest::Error),
    /// The API answered with a non-success status.
    Http {
        status: StatusCode,
        retry_after: Option<&'a str>,
        body: &'a str,
    },
    /// A success status whose body is not valid JSON.
    Undecodable(&'a serde_json::Error),
    /// A decoded payload with a non-empty `errors` array.
    GraphQL {
        messages: &'a [String],
        raw: &'a Value,
    },
}

/// Classifies one failed outcome. Rules are applied in priority order.
pub fn classify(outcome: Outcome<'_>) -> MondayError {
    match outcome {
        Outcome::Transport(err) => classify_transport(err),
        Outcome::Http {
            status,
            retry_after,
            body,
        } => classify_status(status, retry_after, body),
        Outcome::Undecodable(err) => MondayError::api(format!("invalid JSON response: {err}")),
        Outcome::GraphQL { messages, raw } => classify_graphql(messages, raw),
    }
}

fn classify_transport(err: &reqwest::Error) -> MondayError {
    // A builder error means the request itself is malformed (bad URL, header).
    if err.is_builder() {
        return MondayError::api(format!("invalid request: {err}"));
    }
    MondayError::Network(err.to_string())
}

fn classify_status(status: StatusCode, retry_after: Option<&str>, body: &str) -> MondayError {
    match status {
        StatusCode::UNAUTHORIZED => MondayError::Authentication,
        StatusCode::TOO_MANY_REQUESTS => MondayError::RateLimited {
            retry_after: parse_retry_after(retry_after),
        },
        _ => MondayError::Api {
            message: format!("HTTP {}: {body}", status.as_u16()),
            status: Some(status.as_u16()),
            raw: serde_json::from_str(body).ok(),
        },
    }
}

fn classify_graphql(messages: &[String], raw: &Value) -> MondayError {
    let joined = messages.join("; ");
    if messages
        .iter()
        .any(|message| message.to_lowercase().contains("complexity"))
    {
        return MondayError::Complexity(joined);
    }
    MondayError::Api {
        message: format!("GraphQL errors: {joined}"),
        status: None,
        raw: Some(raw.clone()),
    }
}

/// Parses a `Retry-After` value in whole seconds.
pub fn parse_retry_after(value: Option<&str>) -> u64 {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;

    use super::{classify, Outcome};
    use crate::{ErrorKind, MondayError};

    fn http(status: StatusCode, retry_after: Option<&str>, body: &str) -> MondayError {
        classify(Outcome::Http {
            status,
            retry_after,
            body,
        })
    }

    #[test]
    fn unauthorized_is_authentication() {
        let err = http(StatusCode::UNAUTHORIZED, None, "nope");
        assert!(matches!(err, MondayError::Authentication));
    }

    #[test]
    fn too_many_requests_reads_retry_after() {
        for _ in 0..3 {
            let err = http(StatusCode::TOO_MANY_REQUESTS, Some("120"), "");
            assert!(matches!(err, MondayError::RateLimited { retry_after: 120 }));
        }
    }

    #[test]
    fn too_many_requests_defaults_to_sixty_seconds() {
        let missing = http(StatusCode::TOO_MANY_REQUESTS, None, "");
        let garbage = http(
            StatusCode::TOO_MANY_REQUESTS,
            Some("Wed, 21 Oct 2015 07:28:00 GMT"),
            "",
        );
        assert!(matches!(missing, MondayError::RateLimited { retry_after: 60 }));
        assert!(matches!(garbage, MondayError::RateLimited { retry_after: 60 }));
    }

    #[test]
    fn other_status_is_api_error_with_body() {
        let err = http(StatusCode::BAD_GATEWAY, None, "upstream down");
        match err {
            MondayError::Api {
                message, status, ..
            } => {
                assert_eq!(status, Some(502));
                assert!(message.contains("upstream down"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn complexity_message_is_detected_case_insensitively() {
        let messages = vec![
            "Query has complexity score 12000000, maximum allowed is 5000000".to_owned(),
        ];
        let raw = json!({ "errors": [{ "message": messages[0] }] });
        let err = classify(Outcome::GraphQL {
            messages: &messages,
            raw: &raw,
        });
        assert_eq!(err.kind(), ErrorKind::Complexity);

        let shouting = vec!["COMPLEXITY BUDGET EXHAUSTED".to_owned()];
        let err = classify(Outcome::GraphQL {
            messages: &shouting,
            raw: &raw,
        });
        assert_eq!(err.kind(), ErrorKind::Complexity);
    }

    #[test]
    fn graphql_errors_are_joined_and_keep_payload() {
        let messages = vec!["Item not found".to_owned(), "Column missing".to_owned()];
        let raw = json!({
            "errors": [{ "message": "Item not found" }, { "message": "Column missing" }]
        });
        let err = classify(Outcome::GraphQL {
            messages: &messages,
            raw: &raw,
        });
        match err {
            MondayError::Api {
                message,
                raw: Some(payload),
                status: None,
            } => {
                assert_eq!(message, "GraphQL errors: Item not found; Column missing");
                assert_eq!(payload, raw);
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn undecodable_body_is_api_error() {
        let decode_err =
            serde_json::from_str::<serde_json::Value>("<html>").expect_err("must not parse");
        let err = classify(Outcome::Undecodable(&decode_err));
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(err.to_string().contains("invalid JSON response"));
    }
}
