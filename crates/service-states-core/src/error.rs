// Error types for the service state data source

use thiserror::Error;

use crate::entities::RowKey;

/// Result type alias for data source operations
pub type Result<T> = std::result::Result<T, ServiceStateError>;

/// Errors that can occur while building or updating service rows
#[derive(Debug, Error)]
pub enum ServiceStateError {
    /// A request to the monitoring system failed
    #[error("Monitoring request failed: {0}")]
    Request(String),

    /// Registering or releasing an event subscription failed
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Two rows derived the same key
    #[error("Duplicate row key: {0}")]
    DuplicateRowKey(RowKey),

    /// The host called into the data source before initializing it
    #[error("Data source used before initialization")]
    NotInitialized,

    /// A bound input argument could not be used
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The host called a lifecycle method out of order
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceStateError {
    /// Create a monitoring request error
    pub fn request(msg: impl Into<String>) -> Self {
        ServiceStateError::Request(msg.into())
    }

    /// Create a subscription error
    pub fn subscription(msg: impl Into<String>) -> Self {
        ServiceStateError::Subscription(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ServiceStateError::InvalidArgument(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        ServiceStateError::InvalidState(msg.into())
    }
}
