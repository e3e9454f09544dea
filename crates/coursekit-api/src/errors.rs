use coursekit_models::CourseId;
use coursekit_session::FetchError;

/// Error type for calls to the platform API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("API token contains characters not allowed in a header")]
    InvalidToken,

    #[error("Course {0} not found")]
    NotFound(CourseId),

    #[error("Access to course {0} is forbidden")]
    Forbidden(CourseId),

    #[error("Unexpected response status {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<ApiError> for FetchError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotFound(course_id) => FetchError::NotFound(course_id),
            ApiError::Forbidden(course_id) => FetchError::Forbidden(course_id),
            ApiError::Status(status) => FetchError::Status(status),
            ApiError::Decode(e) => FetchError::Decode(e.to_string()),
            other @ (ApiError::Client(_)
            | ApiError::InvalidUrl(_)
            | ApiError::InvalidToken
            | ApiError::Transport(_)) => {
                FetchError::Transport(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_keep_their_kind() {
        let id = CourseId::new("c1");
        assert_eq!(
            FetchError::from(ApiError::NotFound(id.clone())),
            FetchError::NotFound(id.clone())
        );
        assert_eq!(
            FetchError::from(ApiError::Forbidden(id.clone())),
            FetchError::Forbidden(id)
        );
        assert_eq!(
            FetchError::from(ApiError::Status(502)),
            FetchError::Status(502)
        );
    }

    #[test]
    fn test_decode_error_carries_message() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let FetchError::Decode(message) = FetchError::from(ApiError::Decode(json_error)) else {
            panic!("expected decode error");
        };
        assert!(message.contains("EOF"));
    }
}
