use teetime_core::SourceId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// Connection, DNS, TLS, or body-transfer failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("timed out after {budget_ms}ms calling {url}")]
    Timeout { url: String, budget_ms: u64 },

    /// 429 or a 5xx gateway status worth another attempt.
    #[error("retriable HTTP status {status} from {url}")]
    RetriableStatus { status: u16, url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected payload shape for {context}: {reason}")]
    UpstreamFormat { context: String, reason: String },

    #[error("could not resolve {field} for {context}")]
    Parse {
        context: String,
        field: &'static str,
    },

    #[error("invalid upstream URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{source_id} unavailable: all {failed} lookups failed")]
    SourceUnavailable { source_id: SourceId, failed: usize },
}

impl ScraperError {
    /// Classifies a `reqwest` send/read failure, splitting timeouts out of the
    /// generic transport bucket.
    pub(crate) fn from_send(err: reqwest::Error, url: &str, budget_ms: u64) -> Self {
        if err.is_timeout() {
            ScraperError::Timeout {
                url: url.to_owned(),
                budget_ms,
            }
        } else {
            ScraperError::Transport(err)
        }
    }
}
