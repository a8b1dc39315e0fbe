/// Errors that can occur while delivering a batch or talking to the
/// control plane.
///
/// # Examples
///
/// ```rust
/// use hostpulse_delivery::error::DeliveryError;
///
/// let err = DeliveryError::HttpStatus { status: 503 };
/// assert!(err.to_string().contains("503"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The endpoint answered with a non-success status code.
    #[error("endpoint returned status {status}")]
    HttpStatus { status: u16 },

    /// An underlying HTTP transport error from `reqwest`.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Message-bus connect, publish or flush failure.
    #[error("message bus error: {0}")]
    Bus(String),

    /// JSON serialization or deserialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, DeliveryError>;
