use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Local input check failed; no request was sent
    #[error("{0}")]
    Validation(String),

    #[error("CSRF token not found. Please refresh the page.")]
    CsrfMissing,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// Maximum length for error response bodies in log output
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build an error for a non-2xx response. The message comes from the body
    /// when it carries one, otherwise `fallback` is used.
    pub fn from_status(status: StatusCode, body: &str, fallback: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| fallback.to_string());
        match status.as_u16() {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            500..=599 => ApiError::ServerError(message),
            code => ApiError::Rejected { status: code, message },
        }
    }

    /// The text to show the user in an alert
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(message)
            | ApiError::Unauthorized(message)
            | ApiError::AccessDenied(message)
            | ApiError::NotFound(message)
            | ApiError::ServerError(message)
            | ApiError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status for errors that came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::AccessDenied(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the request never left the client
    pub fn is_local(&self) -> bool {
        matches!(self, ApiError::Validation(_) | ApiError::CsrfMissing)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `error`, then `detail`, then joins every string found in the
/// body (field-error maps such as `{"password": ["too short"]}`) with `, `.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    if let Value::Object(ref map) = value {
        for key in ["error", "detail"] {
            if let Some(Value::String(message)) = map.get(key) {
                if !message.is_empty() {
                    return Some(message.clone());
                }
            }
        }
    }

    let mut messages = Vec::new();
    collect_strings(&value, &mut messages);
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(", "))
    }
}

fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_strings(item, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_uses_error_field() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"error": "not found"}"#, "Failed");
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.user_message(), "not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_from_status_uses_detail_field() {
        let err = ApiError::from_status(
            StatusCode::FORBIDDEN,
            r#"{"detail": "Authentication credentials were not provided."}"#,
            "Failed",
        );
        assert!(matches!(err, ApiError::AccessDenied(_)));
        assert_eq!(err.user_message(), "Authentication credentials were not provided.");
    }

    #[test]
    fn test_from_status_joins_field_errors() {
        let body = r#"{"username": ["A user with that username already exists."], "non_field_errors": ["Email already exists"]}"#;
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, body, "Registration failed");
        let message = err.user_message();
        assert!(matches!(err, ApiError::Rejected { status: 400, .. }));
        assert!(message.contains("A user with that username already exists."));
        assert!(message.contains("Email already exists"));
        assert!(message.contains(", "));
    }

    #[test]
    fn test_from_status_falls_back_on_unparseable_body() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>", "Failed to fetch stations");
        assert!(matches!(err, ApiError::ServerError(_)));
        assert_eq!(err.user_message(), "Failed to fetch stations");

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "{}", "Login failed");
        assert_eq!(err.user_message(), "Login failed");
    }

    #[test]
    fn test_local_errors() {
        assert!(ApiError::CsrfMissing.is_local());
        assert!(ApiError::Validation("x".into()).is_local());
        assert!(!ApiError::Network("down".into()).is_local());
        assert_eq!(
            ApiError::CsrfMissing.user_message(),
            "CSRF token not found. Please refresh the page."
        );
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "é".repeat(400); // 800 bytes, multi-byte chars
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("(truncated, 800 total bytes)"));
    }
}
