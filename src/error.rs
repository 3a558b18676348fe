// Error types for issuepress.
// Covers GraphQL transport failures, the CORS allow-list rejection, and local validation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlogError {
    #[error("GraphQL request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Missing {0} environment variable")]
    MissingToken(String),

    #[error("Missing CORS origin: the current origin is not allowed by the GraphQL service")]
    MissingCorsOrigin,

    #[error("{0}")]
    GraphQl(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl BlogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlogError::MissingCorsOrigin => ErrorKind::MissingCors,
            BlogError::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Generic,
        }
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;

/// How a failure is presented to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service rejected our origin; the panel shows remediation steps.
    MissingCors,
    /// Repository, post or label mismatch.
    NotFound,
    /// Anything else, shown with its raw message.
    Generic,
}

/// Cloneable failure carried by shared fetch handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&BlogError> for FetchFailure {
    fn from(err: &BlogError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<BlogError> for FetchFailure {
    fn from(err: BlogError) -> Self {
        Self::from(&err)
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(BlogError::MissingCorsOrigin.kind(), ErrorKind::MissingCors);
        assert_eq!(
            BlogError::NotFound("Missing post.".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(BlogError::Unauthorized.kind(), ErrorKind::Generic);
    }

    #[test]
    fn test_fetch_failure_keeps_message() {
        let failure = FetchFailure::from(BlogError::GraphQl("Bad field".to_string()));
        assert_eq!(failure.kind, ErrorKind::Generic);
        assert_eq!(failure.to_string(), "Bad field");
    }
}
