use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status other than an authentication failure.
    #[error("server returned {0}")]
    Status(StatusCode),

    /// 401/403, or a redirect (the server bounces anonymous users to its
    /// login page).
    #[error("not authenticated (status {0})")]
    Unauthorized(StatusCode),

    /// Body was not the JSON shape the endpoint promises.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Map a response status to the error it implies, if any.
    pub fn from_status(status: StatusCode) -> Option<Self> {
        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || status.is_redirection()
        {
            Some(Self::Unauthorized(status))
        } else if !status.is_success() {
            Some(Self::Status(status))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_redirect_counts_as_unauthorized() {
        assert!(ApiError::from_status(StatusCode::FOUND).is_some_and(|e| e.is_unauthorized()));
        assert!(ApiError::from_status(StatusCode::FORBIDDEN).is_some_and(|e| e.is_unauthorized()));
    }

    #[test]
    fn server_errors_are_plain_status() {
        let err = ApiError::from_status(StatusCode::METHOD_NOT_ALLOWED).unwrap();
        assert!(matches!(err, ApiError::Status(code) if code == StatusCode::METHOD_NOT_ALLOWED));
        assert!(ApiError::from_status(StatusCode::OK).is_none());
    }
}
