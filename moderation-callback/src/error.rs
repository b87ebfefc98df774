//! Error types shared across the crate.

use thiserror::Error;

/// Failure of the persistent configuration store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reason an inbound request failed authentication.
///
/// Callers outside the crate only ever see the resulting 401; the variant
/// exists so the rejection can be logged with the right diagnostic message.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("public or private key is not configured")]
    MissingConfiguration,

    #[error("one or more protocol parameters are absent")]
    MissingParameters,

    #[error("consumer key {observed:?} does not match the configured public key")]
    InvalidConsumerKey { observed: String, expected: String },

    #[error("timestamp is outside the allowed window ({difference})")]
    OutdatedTimestamp { difference: String },

    #[error("nonce is empty")]
    MissingNonce,

    #[error("nonce has already been used")]
    Replay,

    #[error("signature does not match")]
    InvalidSignature {
        base_string: String,
        expected: String,
        sent: String,
    },

    #[error("configuration store unavailable: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Diagnostic message recorded in the log sink for this rejection.
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingConfiguration => "Missing module configuration",
            AuthError::MissingParameters => "Missing protocol parameters",
            AuthError::InvalidConsumerKey { .. } => "Invalid public/consumer key",
            AuthError::OutdatedTimestamp { .. } => "Outdated authentication timestamp",
            AuthError::MissingNonce => "Missing authentication nonce",
            AuthError::Replay => "Replay attack",
            AuthError::InvalidSignature { .. } => "Invalid authentication signature",
            AuthError::Store(_) => "Configuration store unavailable",
        }
    }
}
