use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenAiError {
    #[error("{provider} request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} http {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} response could not be decoded: {reason}")]
    Decode {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} returned no text{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    Empty {
        provider: &'static str,
        reason: Option<String>,
    },
}

impl GenAiError {
    /// Whether retrying the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GenAiError::Request { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_body()
            }
            GenAiError::Status { status, .. } => *status == 429 || *status >= 500,
            GenAiError::Decode { .. } => false,
            GenAiError::Empty { reason, .. } => reason.is_none(),
        }
    }
}
