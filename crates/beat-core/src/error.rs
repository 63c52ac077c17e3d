//! # Store Error Types
//!
//! Typed error handling for the beat-store flow.
//! All checkout and fulfillment operations return `Result<T, StoreError>`.

use thiserror::Error;

/// Core error type for checkout, webhook, and fulfillment operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Beat not found in catalog
    #[error("Beat not found: {beat_id}")]
    BeatNotFound { beat_id: String },

    /// Price missing, non-positive, or otherwise unusable
    #[error("Invalid price: {message}")]
    InvalidPrice { message: String },

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Network/HTTP error communicating with an external service
    #[error("Network error: {0}")]
    Network(String),

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerification(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Outbound email could not be composed
    #[error("Mail compose error: {0}")]
    MailCompose(String),

    /// Outbound email could not be handed to the transport
    #[error("Mail transport error: {0}")]
    MailTransport(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Configuration(_) => 500,
            StoreError::InvalidRequest(_) => 400,
            StoreError::BeatNotFound { .. } => 404,
            StoreError::InvalidPrice { .. } => 400,
            StoreError::Provider { .. } => 502,
            StoreError::Network(_) => 503,
            StoreError::WebhookVerification(_) => 400,
            StoreError::WebhookParse(_) => 400,
            StoreError::MailCompose(_) => 500,
            StoreError::MailTransport(_) => 503,
            StoreError::Serialization(_) => 500,
            StoreError::Internal(_) => 500,
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
