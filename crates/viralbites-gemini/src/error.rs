use thiserror::Error;

/// Errors returned by [`GeminiClient`](crate::GeminiClient).
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the key: invalid, revoked, or reported as leaked.
    #[error("API key rejected ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other non-2xx response.
    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The model's text did not contain a usable JSON object or array.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// The base URL could not be used to build an endpoint.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl GeminiError {
    /// True when the failure means the API key must be rotated.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, GeminiError::Unauthorized { .. })
    }
}

/// Decides whether an error status/message pair denotes a rejected key.
///
/// 401/403 always count. Other statuses count when the message mentions a
/// leaked or invalid API key (the API reports bad keys as 400).
pub(crate) fn is_auth_rejection(status: u16, message: &str) -> bool {
    if status == 401 || status == 403 {
        return true;
    }
    let lower = message.to_ascii_lowercase();
    lower.contains("leaked") || lower.contains("api key not valid") || lower.contains("api_key_invalid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_is_auth_rejection() {
        assert!(is_auth_rejection(403, "Permission denied"));
        assert!(is_auth_rejection(401, ""));
    }

    #[test]
    fn invalid_key_message_is_auth_rejection() {
        assert!(is_auth_rejection(
            400,
            "API key not valid. Please pass a valid API key."
        ));
        assert!(is_auth_rejection(
            400,
            "Your API key was reported as leaked. Please use another API key."
        ));
    }

    #[test]
    fn server_errors_are_not_auth_rejections() {
        assert!(!is_auth_rejection(500, "Internal error"));
        assert!(!is_auth_rejection(429, "Resource has been exhausted"));
    }
}
