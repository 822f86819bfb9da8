use thiserror::Error;

/// Why a single check cycle could not reach a verdict.
///
/// Every variant is terminal to the current cycle only; the polling engine
/// logs it and retries on the next scheduled cycle.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing or mistyped field `{field}` in {context}")]
    MissingField { context: String, field: String },
}

impl CheckError {
    /// `true` for failures that happened before a response body was in hand.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CheckError::Http(_) | CheckError::UnexpectedStatus { .. } | CheckError::InvalidUrl { .. }
        )
    }

    pub(crate) fn missing(context: &str, field: &str) -> Self {
        CheckError::MissingField {
            context: context.to_owned(),
            field: field.to_owned(),
        }
    }
}
