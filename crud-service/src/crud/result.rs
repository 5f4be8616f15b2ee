//! Operation results returned by CRUD services
//!
//! Every [`Service`](super::Service) call produces exactly one
//! [`OperationResult`], which the handler scaffolding converts into an HTTP
//! response. The constructors fix the state and keep the error/value fields
//! consistent with it.
//!
//! # Example
//!
//! ```rust
//! use crud_service::crud::{OperationResult, State};
//!
//! let found = OperationResult::ok("hello");
//! assert_eq!(found.state(), State::Ok);
//! assert_eq!(found.value(), Some(&"hello"));
//!
//! let missing = OperationResult::<String>::not_found();
//! assert_eq!(missing.state(), State::NotFound);
//! assert!(missing.err().is_none());
//! ```

use std::fmt;

/// High level outcome of a CRUD operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// No issues were found
    Ok,
    /// Same as `Ok`, but signals that a new entity was created
    Created,
    /// Something invalid was encountered in the request
    ValidationFailed,
    /// Generic failure, used when none of the other states apply
    Error,
    /// The entity with the given identity does not exist (anymore)
    NotFound,
    /// The operation was understood but conflicts with the entity's current state
    Conflict,
    /// The resource does not support this operation at all (e.g. a read-only lookup table)
    NotSupportedByResource,
}

impl State {
    /// Whether the state represents a successful outcome
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::Created)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Created => write!(f, "created"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::Error => write!(f, "error"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::NotSupportedByResource => write!(f, "not_supported_by_resource"),
        }
    }
}

/// Result of a CRUD operation
///
/// `T` is the payload type produced on success. The value is only populated
/// for `Ok`, the error only for `Error`, `ValidationFailed` and `Conflict`.
///
/// The result is consumed by value when it is written as an HTTP response
/// (see the `IntoResponse` impl in [`response`](super::response)).
#[derive(Debug)]
pub struct OperationResult<T> {
    state: State,
    error: Option<anyhow::Error>,
    value: Option<T>,
}

impl<T> OperationResult<T> {
    /// Successful operation, optionally carrying a value
    ///
    /// # Example
    ///
    /// ```rust
    /// use crud_service::crud::OperationResult;
    ///
    /// let with_value = OperationResult::ok(42);
    /// assert_eq!(with_value.value(), Some(&42));
    ///
    /// let without_value = OperationResult::<i32>::ok(None);
    /// assert!(without_value.value().is_none());
    /// ```
    pub fn ok(value: impl Into<Option<T>>) -> Self {
        Self {
            state: State::Ok,
            error: None,
            value: value.into(),
        }
    }

    /// The entity was created
    pub fn created() -> Self {
        Self {
            state: State::Created,
            error: None,
            value: None,
        }
    }

    /// Unhandled failure
    ///
    /// # Example
    ///
    /// ```rust
    /// use crud_service::crud::{OperationResult, State};
    ///
    /// let result = OperationResult::<()>::error(anyhow::anyhow!("storage offline"));
    /// assert_eq!(result.state(), State::Error);
    /// assert_eq!(result.err().map(ToString::to_string), Some("storage offline".to_string()));
    /// ```
    pub fn error(err: impl Into<anyhow::Error>) -> Self {
        Self::failure(State::Error, err.into())
    }

    /// Invalid input, malformed body or a violated business rule
    pub fn validation_failed(err: impl Into<anyhow::Error>) -> Self {
        Self::failure(State::ValidationFailed, err.into())
    }

    /// The operation conflicts with the current state of the entity
    pub fn conflict(err: impl Into<anyhow::Error>) -> Self {
        Self::failure(State::Conflict, err.into())
    }

    /// No entity with the requested identity
    pub fn not_found() -> Self {
        Self {
            state: State::NotFound,
            error: None,
            value: None,
        }
    }

    /// The resource deliberately does not implement this operation
    pub fn not_supported_by_resource() -> Self {
        Self {
            state: State::NotSupportedByResource,
            error: None,
            value: None,
        }
    }

    /// Assemble a result from raw parts, bypassing the per-state invariants
    ///
    /// Intended for adapters that translate results from other layers. The
    /// response mapping is defined for every combination, so an inconsistent
    /// result is still written deterministically.
    pub fn from_parts(state: State, error: Option<anyhow::Error>, value: Option<T>) -> Self {
        Self {
            state,
            error,
            value,
        }
    }

    fn failure(state: State, error: anyhow::Error) -> Self {
        Self {
            state,
            error: Some(error),
            value: None,
        }
    }

    /// The outcome of the operation
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// The error, if one was attached
    #[must_use]
    pub fn err(&self) -> Option<&anyhow::Error> {
        self.error.as_ref()
    }

    /// The value, if one was attached
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Split the result into its parts
    pub fn into_parts(self) -> (State, Option<anyhow::Error>, Option<T>) {
        (self.state, self.error, self.value)
    }

    /// Transform the value, keeping state and error
    ///
    /// # Example
    ///
    /// ```rust
    /// use crud_service::crud::OperationResult;
    ///
    /// let result = OperationResult::ok(7).map(|n| n.to_string());
    /// assert_eq!(result.value(), Some(&"7".to_string()));
    /// ```
    pub fn map<U, F>(self, f: F) -> OperationResult<U>
    where
        F: FnOnce(T) -> U,
    {
        OperationResult {
            state: self.state,
            error: self.error,
            value: self.value.map(f),
        }
    }
}
