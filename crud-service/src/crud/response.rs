//! Response payloads and the mapping from operation results to HTTP
//!
//! The status code and body of every CRUD response are a pure function of
//! the [`OperationResult`]'s state, error and value:
//!
//! | State                    | Status | Body                              |
//! |--------------------------|--------|-----------------------------------|
//! | `Ok`                     | 200    | value if present, else error/none |
//! | `Created`                | 201    | error details if present          |
//! | `ValidationFailed`       | 400    | error details if present          |
//! | `NotFound`               | 404    | always empty                      |
//! | `Conflict`               | 409    | error details if present          |
//! | `NotSupportedByResource` | 405    | error details if present          |
//! | `Error`                  | 500    | error details if present          |
//!
//! Error details are the default body whenever an error is attached; `Ok`
//! then overrides it with the value, and `NotFound` discards it. A value that
//! serializes to JSON `null` (such as `()`) is written as an empty body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::query::DataSetRequest;
use super::result::{OperationResult, State};

/// Describes the paging that was actually applied to a data set
///
/// # Example
///
/// ```rust
/// use crud_service::crud::{DataSetRequest, PagingInfo};
///
/// let request = DataSetRequest::new().with_page_size(10).with_page_number(2);
/// let paging = PagingInfo::paged(&request, Some(42));
/// assert!(paging.supports_paging);
/// assert_eq!(paging.total_records_count, 42);
///
/// let single = PagingInfo::single_page(7);
/// assert!(!single.supports_paging);
/// assert_eq!(single.page_number, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingInfo {
    /// Whether the data source supports paging at all; when false every
    /// applicable result is on page 1
    pub supports_paging: bool,
    /// Whether the data source knows the exact number of matching records
    pub does_know_total_records: bool,
    /// Maximum number of items per page, at least 1
    pub page_size: u32,
    /// One-based page number
    pub page_number: u32,
    /// Exact number of matching records; zero when unknown
    #[serde(rename = "totalRecordCount")]
    pub total_records_count: u64,
}

impl PagingInfo {
    /// All `count` results on a single page, for sources without paging support
    #[must_use]
    pub fn single_page(count: usize) -> Self {
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        Self {
            supports_paging: false,
            does_know_total_records: true,
            page_size: u32::try_from(count).unwrap_or(u32::MAX).max(1),
            page_number: 1,
            total_records_count: count,
        }
    }

    /// The requested page, with the total record count if the source knows it
    #[must_use]
    pub fn paged(request: &DataSetRequest, total: Option<u64>) -> Self {
        Self {
            supports_paging: true,
            does_know_total_records: total.is_some(),
            page_size: request.page_size.max(1),
            page_number: request.page_number.max(1),
            total_records_count: total.unwrap_or(0),
        }
    }
}

/// A page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSet<T> {
    /// The results, with filtering, sorting and paging applied
    pub items: Vec<T>,
    /// Which page of results this is
    pub paging_info: PagingInfo,
}

impl<T> DataSet<T> {
    /// Create a data set
    pub fn new(items: Vec<T>, paging_info: PagingInfo) -> Self {
        Self { items, paging_info }
    }

    /// Map each item to a new type
    pub fn map<U, F>(self, f: F) -> DataSet<U>
    where
        F: FnMut(T) -> U,
    {
        DataSet {
            items: self.items.into_iter().map(f).collect(),
            paging_info: self.paging_info,
        }
    }
}

/// Error body returned to the caller
///
/// Only the human readable message is exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// What went wrong
    pub message: String,
}

impl ErrorDetails {
    /// Create error details from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&anyhow::Error> for ErrorDetails {
    fn from(error: &anyhow::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Body selected for a CRUD response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody<T> {
    /// No body, only the status line
    Empty,
    /// `{"message": ...}`
    Error(ErrorDetails),
    /// The operation's value
    Value(T),
}

impl State {
    /// HTTP status code for this state
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Ok => StatusCode::OK,
            Self::Created => StatusCode::CREATED,
            Self::ValidationFailed => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::NotSupportedByResource => StatusCode::METHOD_NOT_ALLOWED,
            Self::Error => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<T> OperationResult<T> {
    /// Decide the status code and body for this result
    ///
    /// # Example
    ///
    /// ```rust
    /// use axum::http::StatusCode;
    /// use crud_service::crud::{OperationResult, ResponseBody, State};
    ///
    /// let result = OperationResult::from_parts(
    ///     State::NotFound,
    ///     Some(anyhow::anyhow!("gone")),
    ///     None::<String>,
    /// );
    /// let (status, body) = result.into_http_parts();
    /// assert_eq!(status, StatusCode::NOT_FOUND);
    /// assert_eq!(body, ResponseBody::Empty);
    /// ```
    pub fn into_http_parts(self) -> (StatusCode, ResponseBody<T>) {
        let (state, error, value) = self.into_parts();

        let mut body = match error {
            Some(ref error) => ResponseBody::Error(ErrorDetails::from(error)),
            None => ResponseBody::Empty,
        };

        match state {
            State::Ok => {
                if let Some(value) = value {
                    body = ResponseBody::Value(value);
                }
            }
            State::NotFound => body = ResponseBody::Empty,
            State::Created
            | State::ValidationFailed
            | State::Conflict
            | State::NotSupportedByResource
            | State::Error => {}
        }

        (state.status_code(), body)
    }
}

impl<T: Serialize> IntoResponse for OperationResult<T> {
    fn into_response(self) -> Response {
        let (status, body) = self.into_http_parts();
        match body {
            ResponseBody::Empty => status.into_response(),
            ResponseBody::Error(details) => (status, Json(details)).into_response(),
            ResponseBody::Value(value) => match serde_json::to_value(&value) {
                Ok(serde_json::Value::Null) => status.into_response(),
                Ok(json) => (status, Json(json)).into_response(),
                // Json reports the serialization failure as a 500
                Err(_) => (status, Json(value)).into_response(),
            },
        }
    }
}
