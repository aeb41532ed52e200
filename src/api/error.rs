use thiserror::Error;

pub const CONNECTION_MESSAGE: &str = "Check your internet connection and try again.";
pub const NETWORK_MESSAGE: &str = "Network error. Please try again.";

/// Failure of a backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {message}")]
    Network { message: String, connect: bool },
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network { connect: true, .. } => CONNECTION_MESSAGE.to_string(),
            ApiError::Network { .. } => NETWORK_MESSAGE.to_string(),
            ApiError::Unauthorized => status_message(401).unwrap_or_default().to_string(),
            ApiError::Status { status, message } => match status_message(*status) {
                Some(text) => text.to_string(),
                None if message.trim().is_empty() => {
                    format!("Request failed with status {}.", status)
                }
                None => message.clone(),
            },
            ApiError::Decode(_) => "The server returned an unexpected response.".to_string(),
            ApiError::Io(err) => format!("Could not read file: {}", err),
        }
    }
}

/// Fixed user-facing text for well-known statuses.
pub fn status_message(status: u16) -> Option<&'static str> {
    let text = match status {
        400 => "The request was invalid. Please check your input and try again.",
        401 => "You need to log in to perform this action.",
        403 => "You do not have permission to perform this action.",
        404 => "The requested resource could not be found.",
        409 => "There was a conflict with the current state of the resource.",
        422 => "The data provided is invalid. Please check your input and try again.",
        429 => "Too many requests. Please try again later.",
        500 | 502 | 503 | 504 => "A server error occurred. Please try again later.",
        _ => return None,
    };
    Some(text)
}

/// Pulls `detail` or `message` out of a JSON error body, falling back to the
/// raw text.
pub fn extract_server_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message"] {
            match value.get(key) {
                Some(serde_json::Value::String(text)) => return text.clone(),
                Some(serde_json::Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_use_fixed_text() {
        let err = ApiError::Status {
            status: 404,
            message: "Invoice not found".into(),
        };
        assert_eq!(
            err.user_message(),
            "The requested resource could not be found."
        );
        let err = ApiError::Status {
            status: 503,
            message: String::new(),
        };
        assert_eq!(
            err.user_message(),
            "A server error occurred. Please try again later."
        );
    }

    #[test]
    fn other_statuses_use_server_message() {
        let err = ApiError::Status {
            status: 418,
            message: "short and stout".into(),
        };
        assert_eq!(err.user_message(), "short and stout");
        let err = ApiError::Status {
            status: 418,
            message: " ".into(),
        };
        assert_eq!(err.user_message(), "Request failed with status 418.");
    }

    #[test]
    fn server_message_prefers_detail() {
        assert_eq!(
            extract_server_message(r#"{"detail": "Template not found"}"#),
            "Template not found"
        );
        assert_eq!(
            extract_server_message(r#"{"message": "Duplicate tag"}"#),
            "Duplicate tag"
        );
        assert_eq!(extract_server_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn connection_failures_suggest_checking_network() {
        let err = ApiError::Network {
            message: "refused".into(),
            connect: true,
        };
        assert_eq!(err.user_message(), CONNECTION_MESSAGE);
        assert_eq!(err.status(), None);
        assert_eq!(ApiError::Unauthorized.status(), Some(401));
    }
}
