//! Capability traits implemented by resource owners
//!
//! - [`Service`]: the CRUD operations of a resource. Every operation has a
//!   default implementation answering `NotSupportedByResource`, so a resource
//!   only overrides what it actually supports.
//! - [`Entity`]: what a request body must be able to do (validate itself and
//!   normalize its fields).
//!
//! Async methods use RPITIT (Return Position Impl Trait In Traits);
//! implementations can simply be written as `async fn`.
//!
//! # Example
//!
//! ```rust
//! use crud_service::crud::{
//!     DataSet, DataSetRequest, Entity, EntityKey, OperationResult, PagingInfo, Service,
//!     ValidationError,
//! };
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Country {
//!     code: String,
//!     name: String,
//! }
//!
//! impl Entity for Country {
//!     fn validate(&self) -> Result<(), ValidationError> {
//!         if self.code.len() != 2 {
//!             return Err(ValidationError::new("country code must have two letters"));
//!         }
//!         Ok(())
//!     }
//!
//!     fn format(&mut self, _is_new: bool) {
//!         self.code = self.code.to_uppercase();
//!     }
//! }
//!
//! /// Read-only lookup table: add/update/delete keep their defaults
//! struct Countries(Vec<Country>);
//!
//! impl Service for Countries {
//!     type Entity = Country;
//!     type Item = Country;
//!     type Created = String;
//!
//!     async fn get_all(&self, _request: DataSetRequest) -> OperationResult<DataSet<Country>> {
//!         let items = self.0.clone();
//!         let paging = PagingInfo::single_page(items.len());
//!         OperationResult::ok(DataSet::new(items, paging))
//!     }
//!
//!     async fn get_by_id(&self, id: EntityKey) -> OperationResult<Country> {
//!         match self.0.iter().find(|c| c.code == id.as_str()) {
//!             Some(country) => OperationResult::ok(country.clone()),
//!             None => OperationResult::not_found(),
//!         }
//!     }
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use super::query::DataSetRequest;
use super::response::DataSet;
use super::result::OperationResult;

/// Opaque identity of an entity, taken verbatim from the route
///
/// # Example
///
/// ```rust
/// use crud_service::crud::EntityKey;
///
/// let key = EntityKey::new("42");
/// assert_eq!(key.as_str(), "42");
/// assert_eq!(key.parse::<u64>().unwrap(), 42);
/// assert!(EntityKey::new("abc").parse::<u64>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Wrap a raw identity token
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw token
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the token into the resource's native key type
    ///
    /// # Errors
    ///
    /// Returns the parse error of `T` when the token is not a valid `T`.
    pub fn parse<T: FromStr>(&self) -> Result<T, T::Err> {
        self.0.parse()
    }

    /// Unwrap into the raw token
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for EntityKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

/// Why an entity was rejected
///
/// The display output is what the caller sees as the error message, so it
/// includes the field errors.
///
/// # Example
///
/// ```rust
/// use crud_service::crud::ValidationError;
///
/// let error = ValidationError::new("Invalid note")
///     .with_field_error("title", "must not be empty");
/// assert_eq!(error.to_string(), "Invalid note (title: must not be empty)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", format_field_errors(.fields))]
pub struct ValidationError {
    /// Summary of the problem
    pub message: String,
    /// Per-field details, possibly empty
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    /// Create a validation error without field details
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Attach a field error
    #[must_use]
    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
        self
    }
}

fn format_field_errors(fields: &[FieldError]) -> String {
    if fields.is_empty() {
        return String::new();
    }
    let details: Vec<String> = fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect();
    format!(" ({})", details.join("; "))
}

impl<T> From<ValidationError> for OperationResult<T> {
    fn from(error: ValidationError) -> Self {
        OperationResult::validation_failed(error)
    }
}

/// What a CRUD entity must implement
///
/// Neither method is called by the handler scaffolding; the service decides
/// when to run them (usually through [`Entity::prepare`]).
pub trait Entity {
    /// Check whether the entity is valid
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing every rule that was violated.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Normalize the entity, e.g. fix casing or fill calculated fields
    ///
    /// `is_new` is true for a new entity, false for an update of an existing one.
    fn format(&mut self, is_new: bool);

    /// Format, then validate
    ///
    /// # Errors
    ///
    /// Returns the error from [`Entity::validate`].
    fn prepare(&mut self, is_new: bool) -> Result<(), ValidationError> {
        self.format(is_new);
        self.validate()
    }
}

/// The CRUD operations of a resource
///
/// # Type Parameters
///
/// - `Entity`: the request body type for `add` and `update`
/// - `Item`: the payload returned by reads and updates
/// - `Created`: the payload returned by `add`, typically the new identity
///
/// Operations that are left at their default answer `NotSupportedByResource`
/// (HTTP 405).
pub trait Service: Send + Sync + 'static {
    /// Request body for create and update
    type Entity: Entity + DeserializeOwned + fmt::Debug + Send + 'static;
    /// Payload of reads and updates
    type Item: Serialize + Send + 'static;
    /// Payload of a successful create
    type Created: Serialize + Send + 'static;

    /// Apply resource policy to a normalized list request
    ///
    /// Called by the list handler between normalization and [`Service::get_all`].
    /// The default leaves the request untouched.
    fn constrain_request(&self, request: &mut DataSetRequest) {
        let _ = request;
    }

    /// List entities, applying paging, sorting and filtering where supported
    fn get_all(
        &self,
        request: DataSetRequest,
    ) -> impl Future<Output = OperationResult<DataSet<Self::Item>>> + Send {
        let _ = request;
        async { OperationResult::not_supported_by_resource() }
    }

    /// Get the entity with the given identity
    fn get_by_id(&self, id: EntityKey) -> impl Future<Output = OperationResult<Self::Item>> + Send {
        let _ = id;
        async { OperationResult::not_supported_by_resource() }
    }

    /// Add a new entity; the value on success is the new identity or entity
    fn add(
        &self,
        entity: Self::Entity,
    ) -> impl Future<Output = OperationResult<Self::Created>> + Send {
        let _ = entity;
        async { OperationResult::not_supported_by_resource() }
    }

    /// Update an existing entity; the value on success is its new state
    fn update(
        &self,
        id: EntityKey,
        entity: Self::Entity,
    ) -> impl Future<Output = OperationResult<Self::Item>> + Send {
        let _ = (id, entity);
        async { OperationResult::not_supported_by_resource() }
    }

    /// Delete the entity with the given identity
    fn delete(&self, id: EntityKey) -> impl Future<Output = OperationResult<()>> + Send {
        let _ = id;
        async { OperationResult::not_supported_by_resource() }
    }
}
