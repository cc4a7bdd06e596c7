use serde::Deserialize;
use thiserror::Error;

/// Error returned by account API calls.
///
/// `Display` is the normalized error code that propagates to callers and
/// user-facing notifications: the machine-readable `code` from the error
/// body when the server provided one, otherwise the transport or status
/// message.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Server rejected the request with a structured `code` in the body.
    #[error("{code}")]
    Rejected {
        status: reqwest::StatusCode,
        code: String,
    },

    /// Server rejected the request without a structured code.
    #[error("Request failed with status code {}", .status.as_u16())]
    Status { status: reqwest::StatusCode },

    /// No response received.
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// Refresh was attempted with no stored token; never hits the network.
    #[error("Error: No user to refresh")]
    NoSession,
}

/// Error body shape used by the account API: `{ "code": "EMAIL_TAKEN" }`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
}

impl ApiError {
    /// The normalized error code surfaced to callers.
    pub fn code(&self) -> String {
        self.to_string()
    }

    /// HTTP status of the rejection, if a response was received.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ApiError::Rejected { status, .. } | ApiError::Status { status } => Some(*status),
            ApiError::Network(e) => e.status(),
            ApiError::NoSession => None,
        }
    }

    /// Map a non-success response to an error, consuming the body.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::from_status(status, &body)
    }

    /// Structured `code` takes precedence; anything else (no body, no code
    /// field, unparseable JSON) falls back to the generic status message.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { code: Some(code) }) if !code.is_empty() => {
                ApiError::Rejected { status, code }
            }
            _ => ApiError::Status { status },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_structured_code_takes_precedence() {
        let err = ApiError::from_status(StatusCode::CONFLICT, r#"{"code":"EMAIL_TAKEN"}"#);
        assert_eq!(err.code(), "EMAIL_TAKEN");
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    }

    #[test]
    fn test_extra_body_fields_are_ignored() {
        let body = r#"{"message":"email already registered","code":"EMAIL_TAKEN","details":{}}"#;
        let err = ApiError::from_status(StatusCode::CONFLICT, body);
        assert_eq!(err.code(), "EMAIL_TAKEN");
    }

    #[test]
    fn test_missing_code_falls_back_to_status_message() {
        let err = ApiError::from_status(StatusCode::CONFLICT, r#"{"message":"taken"}"#);
        assert_eq!(err.code(), "Request failed with status code 409");
    }

    #[test]
    fn test_empty_and_unparseable_bodies_fall_back() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.code(), "Request failed with status code 500");

        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert_eq!(err.code(), "Request failed with status code 502");
    }

    #[test]
    fn test_empty_code_string_is_not_a_code() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"code":""}"#);
        assert_eq!(err.code(), "Request failed with status code 401");
    }

    #[test]
    fn test_no_session_code_is_fixed() {
        assert_eq!(ApiError::NoSession.code(), "Error: No user to refresh");
        assert_eq!(ApiError::NoSession.status(), None);
    }
}
