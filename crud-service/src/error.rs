//! Service-level error types
//!
//! Errors of individual CRUD operations travel inside
//! [`OperationResult`](crate::crud::OperationResult) as `anyhow::Error`; this
//! type covers everything around them (configuration, binding, startup).

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or running the service
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let error: Error = std::io::Error::other("address in use").into();
        assert!(matches!(error, Error::Io(_)));
        assert_eq!(error.to_string(), "I/O error: address in use");
    }

    #[test]
    fn test_internal_error_display() {
        let error = Error::Internal("tracing already set".to_string());
        assert_eq!(error.to_string(), "Internal error: tracing already set");
    }

    #[test]
    fn test_error_converts_into_operation_result() {
        use crate::crud::{OperationResult, State};

        let result = OperationResult::<()>::error(Error::Internal("boom".to_string()));
        assert_eq!(result.state(), State::Error);
        assert_eq!(result.err().unwrap().to_string(), "Internal error: boom");
    }
}
