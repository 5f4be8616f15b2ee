//! REST CRUD protocol layer
//!
//! A resource implements [`Service`] (and [`Entity`] for its request body);
//! [`ResourceRouter`] turns it into five HTTP endpoints with a uniform
//! contract for list queries, status codes and error bodies.
//!
//! # Modules
//!
//! - [`result`]: [`OperationResult`] and its [`State`]
//! - [`query`]: [`DataSetRequest`], normalized from the list query string
//! - [`constrain`]: resource policy applied to a [`DataSetRequest`]
//! - [`response`]: [`DataSet`], [`PagingInfo`] and the mapping of results to HTTP
//! - [`traits`]: [`Service`], [`Entity`], [`EntityKey`]
//! - [`routes`]: handlers and [`ResourceRouter`]
//!
//! # Wire format
//!
//! List query parameters (case-insensitive names): `pageSize`, `pageNumber`,
//! `sortColumn`, `sortDirection` (`desc` selects descending, anything else
//! ascending) and `filters` (a JSON object of column to value). Invalid values
//! fall back to the defaults (15, 1, `id`, ascending, no filters).
//!
//! Error bodies are `{"message": "..."}`.

pub mod constrain;
pub mod query;
pub mod response;
pub mod result;
pub mod routes;
pub mod traits;

pub use query::{
    DataSetRequest, SortDirection, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, DEFAULT_SORT_COLUMN,
};
pub use response::{DataSet, ErrorDetails, PagingInfo, ResponseBody};
pub use result::{OperationResult, State};
pub use routes::{
    action_not_available, panic_response, recover_from_panic, CrudOperation, ResourceRouter,
    ResourceState, BODY_PARSE_ERROR_PREFIX, PANIC_MESSAGE,
};
pub use traits::{Entity, EntityKey, FieldError, Service, ValidationError};
