use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{backend} request failed: {source}")]
    Request {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{backend} returned HTTP {status}")]
    Status { backend: &'static str, status: u16 },

    #[error("{backend} response could not be parsed: {reason}")]
    Parse {
        backend: &'static str,
        reason: String,
    },

    #[error("{backend} payload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        backend: &'static str,
        size: usize,
        limit: usize,
    },
}

impl SearchError {
    /// Whether retrying the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SearchError::Request { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            SearchError::Status { status, .. } => *status == 429 || *status >= 500,
            SearchError::Parse { .. } | SearchError::TooLarge { .. } => false,
        }
    }
}
