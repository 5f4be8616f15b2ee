//! # crud-service
//!
//! REST CRUD protocol layer for axum services.
//!
//! A resource implements [`Service`](crud::Service) for the operations it
//! supports; the crate provides the HTTP side: query string normalization,
//! uniform status codes and error bodies, panic recovery and routing.
//!
//! ## Features
//!
//! - **Uniform contract**: every operation yields an [`OperationResult`](crud::OperationResult)
//!   whose state alone decides the status code
//! - **List queries**: `pageSize`, `pageNumber`, `sortColumn`, `sortDirection` and
//!   JSON `filters`, normalized with safe defaults and never rejected
//! - **Constraints**: per-resource limits on page size, sort and filter columns
//! - **Panic recovery**: a panicking operation answers 500 with a fixed message
//! - **Ambient stack**: figment configuration, JSON tracing, graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use crud_service::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Note {
//!     title: String,
//! }
//!
//! impl Entity for Note {
//!     fn validate(&self) -> std::result::Result<(), ValidationError> {
//!         if self.title.is_empty() {
//!             return Err(ValidationError::new("title is required"));
//!         }
//!         Ok(())
//!     }
//!
//!     fn format(&mut self, _is_new: bool) {
//!         self.title = self.title.trim().to_string();
//!     }
//! }
//!
//! struct Notes {
//!     paging: PagingConfig,
//! }
//!
//! impl Service for Notes {
//!     type Entity = Note;
//!     type Item = Note;
//!     type Created = String;
//!
//!     fn constrain_request(&self, request: &mut DataSetRequest) {
//!         self.paging.apply(request);
//!         request.constrain_sort_columns("id", &["id", "title"]);
//!     }
//!
//!     async fn get_all(&self, _request: DataSetRequest) -> OperationResult<DataSet<Note>> {
//!         OperationResult::ok(DataSet::new(Vec::new(), PagingInfo::single_page(0)))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let app = ResourceRouter::new("notes", Notes { paging: config.paging })
//!         .into_router();
//!
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod config;
pub mod crud;
pub mod error;
pub mod observability;
pub mod server;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, MiddlewareConfig, PagingConfig, ServiceConfig};
    pub use crate::crud::{
        action_not_available, CrudOperation, DataSet, DataSetRequest, Entity, EntityKey,
        ErrorDetails, FieldError, OperationResult, PagingInfo, ResourceRouter, Service,
        SortDirection, State, ValidationError,
    };
    pub use crate::error::{Error, Result};
    pub use crate::observability::init_tracing;
    pub use crate::server::Server;

    pub use axum::{
        routing::{delete, get, post, put},
        Json, Router,
    };
}
