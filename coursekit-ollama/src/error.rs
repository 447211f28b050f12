//! Internal error helpers for mapping HTTP/reqwest errors to [`GenerateError`].

use std::time::Duration;

use coursekit_types::GenerateError;

/// Map an HTTP status code (from the Ollama API) to a [`GenerateError`].
///
/// Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md>
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> GenerateError {
    let message = error_message(body);
    match status.as_u16() {
        404 => GenerateError::ModelNotFound(message),
        400 => GenerateError::InvalidRequest(message),
        500..=599 => GenerateError::ServiceUnavailable(message),
        _ => GenerateError::InvalidRequest(format!("HTTP {status}: {message}")),
    }
}

/// Map a [`reqwest::Error`] to a [`GenerateError`].
///
/// `timeout` is the limit that was configured for the request, reported back
/// when it fires.
pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> GenerateError {
    if err.is_timeout() {
        GenerateError::Timeout(timeout)
    } else {
        GenerateError::Network(Box::new(err))
    }
}

/// Ollama wraps errors as `{"error":"..."}`; unwrap that when present.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_404_maps_to_model_not_found() {
        let err = map_http_status(reqwest::StatusCode::NOT_FOUND, "model 'foo' not found");
        assert!(matches!(err, GenerateError::ModelNotFound(msg) if msg == "model 'foo' not found"));
    }

    #[test]
    fn status_404_unwraps_json_error_body() {
        let err = map_http_status(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"error":"model \"foo\" not found, try pulling it first"}"#,
        );
        assert!(
            matches!(err, GenerateError::ModelNotFound(msg) if msg == r#"model "foo" not found, try pulling it first"#)
        );
    }

    #[test]
    fn status_400_maps_to_invalid_request() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "bad body");
        assert!(matches!(err, GenerateError::InvalidRequest(msg) if msg == "bad body"));
    }

    #[test]
    fn status_5xx_maps_to_service_unavailable() {
        for code in [500, 502, 503, 599] {
            let status = reqwest::StatusCode::from_u16(code).expect("valid status");
            let err = map_http_status(status, "down");
            assert!(
                matches!(err, GenerateError::ServiceUnavailable(ref msg) if msg == "down"),
                "{code} mapped to {err:?}"
            );
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn unknown_status_maps_to_invalid_request_with_status() {
        let err = map_http_status(reqwest::StatusCode::FORBIDDEN, "forbidden");
        match err {
            GenerateError::InvalidRequest(msg) => {
                assert!(msg.contains("403"), "expected status in message: {msg}");
                assert!(msg.contains("forbidden"), "expected body in message: {msg}");
            }
            other => panic!("expected InvalidRequest, got: {other:?}"),
        }
    }

    #[test]
    fn empty_body_preserved_in_error() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "");
        assert!(matches!(err, GenerateError::InvalidRequest(msg) if msg.is_empty()));
    }
}
