/// Everything that can go wrong while a provider fetches an id list or an item.
///
/// The refresh core never looks inside these; any variant counts as one
/// failure.  The split exists for logs and for the error line on screen.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    #[error("API endpoint returned invalid status: {status}")]
    Status { status: reqwest::StatusCode },

    #[error("error while decoding the JSON response from the server: {source}")]
    Decode {
        #[from]
        source: serde_json::Error,
    },

    #[error("malformed response from the server: {reason}")]
    Malformed { reason: String },
}

impl FetchError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        FetchError::Malformed {
            reason: reason.into(),
        }
    }
}
