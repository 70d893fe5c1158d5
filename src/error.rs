use thiserror::Error;

/// Errors surfaced by backend operations.
///
/// The `Backend error: …` display strings are rendered verbatim by the
/// host shell, so their wording is part of the protocol with the UI.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),

    #[error("Invalid UTF-8 in response")]
    InvalidUtf8,

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend answered with `success: false`.
    #[error("Backend error: {code}: {message}")]
    Api { code: i64, message: String },

    /// The backend answered with `success: true` but no payload.
    #[error("Backend error: Missing data")]
    MissingData,

    /// A required identifier was empty. Checked before any request is made.
    #[error("Backend error: Missing ID")]
    MissingId,

    /// The response arrived after its session had been replaced or a newer
    /// request for the same slot had been issued. The payload was dropped.
    #[error("Backend error: Invalidated {0}")]
    Superseded(&'static str),

    /// A pending search was canceled by the host.
    #[error("Search canceled")]
    Canceled,
}

impl BackendError {
    /// Maps the envelope error fields, applying the protocol defaults for
    /// absent values.
    pub(crate) fn api(code: Option<i64>, message: Option<String>) -> Self {
        BackendError::Api {
            code: code.unwrap_or(-1),
            message: message.unwrap_or_else(|| "Unknown error".to_string()),
        }
    }

    /// Returns true if this error is transient and a reload may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Timeout(_) | BackendError::Network(_) => true,
            BackendError::HttpStatus(status) => *status >= 500,
            BackendError::ResponseTooLarge(_)
            | BackendError::InvalidUtf8
            | BackendError::Decode(_)
            | BackendError::Api { .. }
            | BackendError::MissingData
            | BackendError::MissingId
            | BackendError::Superseded(_)
            | BackendError::Canceled => false,
        }
    }
}
