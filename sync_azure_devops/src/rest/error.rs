use thiserror::Error;

/// Errors returned at the HTTP boundary.
///
/// A 404 response is surfaced as [`ApiError::NotFound`] so callers can branch
/// on absence without looking at message text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested object doesn't exist.
    #[error("not found: {url}")]
    NotFound {
        /// The request URL
        url: String,
    },

    /// Any other non-success status.
    #[error("request to {url} failed with status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The request URL
        url: String,
        /// Response body, as text
        body: String,
    },

    /// The request couldn't be sent or read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A middleware (e.g. retry) failed.
    #[error("middleware error: {0}")]
    Middleware(anyhow::Error),

    /// The response body didn't match the expected shape.
    #[error("unable to decode response from {url}: {source}")]
    Decode {
        /// The request URL
        url: String,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// A request couldn't be built from the arguments given.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ApiError {
    /// Whether this error means the object is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

impl From<reqwest_middleware::Error> for ApiError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => ApiError::Http(e),
            reqwest_middleware::Error::Middleware(e) => ApiError::Middleware(e),
        }
    }
}
