//! HTTP handler scaffolding for CRUD resources
//!
//! [`ResourceRouter`] mounts the five CRUD endpoints of a [`Service`]:
//!
//! | Method   | Path            | Operation          |
//! |----------|-----------------|--------------------|
//! | `GET`    | `/{name}`       | [`Service::get_all`]   |
//! | `POST`   | `/{name}`       | [`Service::add`]       |
//! | `GET`    | `/{name}/{id}`  | [`Service::get_by_id`] |
//! | `PUT`    | `/{name}/{id}`  | [`Service::update`]    |
//! | `DELETE` | `/{name}/{id}`  | [`Service::delete`]    |
//!
//! Each handler extracts its inputs, calls the service exactly once and
//! writes the [`OperationResult`] as the response. A panic anywhere in that
//! work is recovered and answered with a 500 carrying
//! `{"message":"Panic while handling request"}`.
//!
//! # Example
//!
//! ```rust
//! use axum::Router;
//! use crud_service::crud::{CrudOperation, EntityKey, Entity, OperationResult, ResourceRouter,
//!     Service, ValidationError};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Ping {
//!     text: String,
//! }
//!
//! impl Entity for Ping {
//!     fn validate(&self) -> Result<(), ValidationError> {
//!         Ok(())
//!     }
//!     fn format(&mut self, _is_new: bool) {}
//! }
//!
//! struct Pings;
//!
//! impl Service for Pings {
//!     type Entity = Ping;
//!     type Item = Ping;
//!     type Created = String;
//!
//!     async fn get_by_id(&self, id: EntityKey) -> OperationResult<Ping> {
//!         OperationResult::ok(Ping { text: id.into_inner() })
//!     }
//! }
//!
//! let app: Router = ResourceRouter::new("pings", Pings)
//!     .not_available(CrudOperation::Delete)
//!     .into_router();
//! ```

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Router,
};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::query::DataSetRequest;
use super::result::OperationResult;
use super::traits::{EntityKey, Service};

/// Message returned to the caller when a request handler panicked
pub const PANIC_MESSAGE: &str = "Panic while handling request";

/// Prefix of the message returned when a request body can't be decoded
pub const BODY_PARSE_ERROR_PREFIX: &str = "Failed to parse entity from HTTP body: ";

/// The operations a resource exposes over HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudOperation {
    /// `GET /{name}`
    List,
    /// `GET /{name}/{id}`
    Get,
    /// `POST /{name}`
    Create,
    /// `PUT /{name}/{id}`
    Update,
    /// `DELETE /{name}/{id}`
    Delete,
}

impl fmt::Display for CrudOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Router state shared by the handlers of one resource
pub struct ResourceState<S> {
    service: Arc<S>,
    resource: Arc<str>,
}

impl<S> ResourceState<S> {
    /// Create state for the named resource
    pub fn new(resource: impl Into<Arc<str>>, service: Arc<S>) -> Self {
        Self {
            service,
            resource: resource.into(),
        }
    }

    /// The service backing the resource
    pub fn service(&self) -> &S {
        &self.service
    }

    /// The resource name, used in logs
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

// Manual impl: deriving would require `S: Clone`
impl<S> Clone for ResourceState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            resource: Arc::clone(&self.resource),
        }
    }
}

/// `GET /{name}`: list entities
///
/// The query string is normalized into a [`DataSetRequest`] (never rejected),
/// then [`Service::constrain_request`] applies the resource's policy before
/// [`Service::get_all`] is called.
pub async fn list<S: Service>(
    State(state): State<ResourceState<S>>,
    mut request: DataSetRequest,
) -> Response {
    guarded(&state.resource, CrudOperation::List, async {
        state.service.constrain_request(&mut request);
        debug!(resource = %state.resource, %request, "interpreted as list command");
        state.service.get_all(request).await.into_response()
    })
    .await
}

/// `GET /{name}/{id}`: fetch one entity
pub async fn get_by_id<S: Service>(
    State(state): State<ResourceState<S>>,
    Path(id): Path<String>,
) -> Response {
    guarded(&state.resource, CrudOperation::Get, async {
        debug!(resource = %state.resource, %id, "interpreted as get command");
        state.service.get_by_id(EntityKey::new(id)).await.into_response()
    })
    .await
}

/// `POST /{name}`: create an entity from the JSON body
///
/// An undecodable body is answered with 400 without calling the service.
pub async fn create<S: Service>(State(state): State<ResourceState<S>>, body: Bytes) -> Response {
    guarded(&state.resource, CrudOperation::Create, async {
        let entity = match decode_entity::<S::Entity>(&state.resource, &body) {
            Ok(entity) => entity,
            Err(rejection) => return rejection.into_response(),
        };
        debug!(resource = %state.resource, ?entity, "interpreted as create command");
        state.service.add(entity).await.into_response()
    })
    .await
}

/// `PUT /{name}/{id}`: replace an entity with the JSON body
///
/// An undecodable body is answered with 400 without calling the service.
pub async fn update<S: Service>(
    State(state): State<ResourceState<S>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    guarded(&state.resource, CrudOperation::Update, async {
        let entity = match decode_entity::<S::Entity>(&state.resource, &body) {
            Ok(entity) => entity,
            Err(rejection) => return rejection.into_response(),
        };
        debug!(resource = %state.resource, %id, ?entity, "interpreted as update command");
        state
            .service
            .update(EntityKey::new(id), entity)
            .await
            .into_response()
    })
    .await
}

/// `DELETE /{name}/{id}`: delete an entity
pub async fn delete<S: Service>(
    State(state): State<ResourceState<S>>,
    Path(id): Path<String>,
) -> Response {
    guarded(&state.resource, CrudOperation::Delete, async {
        debug!(resource = %state.resource, %id, "interpreted as delete command");
        state.service.delete(EntityKey::new(id)).await.into_response()
    })
    .await
}

/// Stub for a route the resource doesn't offer: 405 with an empty body
pub async fn action_not_available() -> Response {
    OperationResult::<()>::not_supported_by_resource().into_response()
}

/// Answer for a recovered panic
///
/// # Example
///
/// ```rust
/// use axum::http::StatusCode;
/// use crud_service::crud::panic_response;
///
/// assert_eq!(panic_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
#[must_use]
pub fn panic_response() -> Response {
    OperationResult::<()>::error(anyhow::anyhow!(PANIC_MESSAGE)).into_response()
}

/// Log a panic payload and produce [`panic_response`]
///
/// Has the shape `tower_http::catch_panic::CatchPanicLayer::custom` expects,
/// so panics outside the CRUD handlers get the same answer.
pub fn recover_from_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    error!(panic = %panic_message(payload.as_ref()), "{PANIC_MESSAGE}");
    panic_response()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

/// Run the handler work, converting a panic into the 500 answer
async fn guarded<F>(resource: &str, operation: CrudOperation, work: F) -> Response
where
    F: Future<Output = Response>,
{
    debug!(resource, %operation, "CRUD operation requested");
    match AssertUnwindSafe(work).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            error!(
                resource,
                %operation,
                panic = %panic_message(payload.as_ref()),
                "{PANIC_MESSAGE}"
            );
            panic_response()
        }
    }
}

fn decode_entity<E: DeserializeOwned>(resource: &str, body: &[u8]) -> Result<E, OperationResult<()>> {
    serde_json::from_slice(body).map_err(|err| {
        debug!(resource, error = %err, "rejecting undecodable request body");
        OperationResult::validation_failed(anyhow::anyhow!("{BODY_PARSE_ERROR_PREFIX}{err}"))
    })
}

/// Builder that mounts a [`Service`] under `/{name}`
///
/// Operations marked with [`ResourceRouter::not_available`] are routed to
/// [`action_not_available`] instead of the service.
#[must_use]
pub struct ResourceRouter<S> {
    name: String,
    service: Arc<S>,
    unavailable: HashSet<CrudOperation>,
}

impl<S: Service> ResourceRouter<S> {
    /// Mount `service` under `/{name}`
    ///
    /// Leading and trailing slashes in `name` are ignored.
    pub fn new(name: impl Into<String>, service: S) -> Self {
        Self::from_arc(name, Arc::new(service))
    }

    /// Mount a service that is shared with other parts of the application
    pub fn from_arc(name: impl Into<String>, service: Arc<S>) -> Self {
        let name = name.into().trim_matches('/').to_string();
        Self {
            name,
            service,
            unavailable: HashSet::new(),
        }
    }

    /// Route `operation` to the 405 stub
    pub fn not_available(mut self, operation: CrudOperation) -> Self {
        self.unavailable.insert(operation);
        self
    }

    /// Whether `operation` is routed to the service
    #[must_use]
    pub fn is_available(&self, operation: CrudOperation) -> bool {
        !self.unavailable.contains(&operation)
    }

    /// Path of the collection, e.g. `/notes`
    #[must_use]
    pub fn collection_path(&self) -> String {
        format!("/{}", self.name)
    }

    /// Path template of a single entity, e.g. `/notes/{id}`
    #[must_use]
    pub fn item_path(&self) -> String {
        format!("/{}/{{id}}", self.name)
    }

    /// Build the router; it can be merged into any application router
    pub fn into_router<T>(self) -> Router<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let collection_path = self.collection_path();
        let item_path = self.item_path();

        let mut collection = MethodRouter::<ResourceState<S>>::new();
        collection = if self.is_available(CrudOperation::List) {
            collection.get(list::<S>)
        } else {
            collection.get(action_not_available)
        };
        collection = if self.is_available(CrudOperation::Create) {
            collection.post(create::<S>)
        } else {
            collection.post(action_not_available)
        };

        let mut item = MethodRouter::<ResourceState<S>>::new();
        item = if self.is_available(CrudOperation::Get) {
            item.get(get_by_id::<S>)
        } else {
            item.get(action_not_available)
        };
        item = if self.is_available(CrudOperation::Update) {
            item.put(update::<S>)
        } else {
            item.put(action_not_available)
        };
        item = if self.is_available(CrudOperation::Delete) {
            item.delete(delete::<S>)
        } else {
            item.delete(action_not_available)
        };

        debug!(
            resource = %self.name,
            unavailable = ?self.unavailable,
            "mounting CRUD resource"
        );

        let state = ResourceState::new(self.name, self.service);
        Router::new()
            .route(&collection_path, collection)
            .route(&item_path, item)
            .with_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::{Entity, ValidationError};
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        value: i64,
    }

    impl Entity for Probe {
        fn validate(&self) -> Result<(), ValidationError> {
            Ok(())
        }
        fn format(&mut self, _is_new: bool) {}
    }

    struct NoOps;

    impl Service for NoOps {
        type Entity = Probe;
        type Item = ();
        type Created = ();
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(CrudOperation::List.to_string(), "list");
        assert_eq!(CrudOperation::Delete.to_string(), "delete");
    }

    #[test]
    fn test_resource_state_accessors_share_service() {
        let state = ResourceState::new("probes", Arc::new(NoOps));
        let cloned = state.clone();
        assert_eq!(cloned.resource(), "probes");
        assert!(std::ptr::eq(state.service(), cloned.service()));
    }

    #[test]
    fn test_paths_strip_slashes() {
        let router = ResourceRouter::new("/notes/", NoOps);
        assert_eq!(router.collection_path(), "/notes");
        assert_eq!(router.item_path(), "/notes/{id}");
    }

    #[test]
    fn test_not_available_marks_operation() {
        let router = ResourceRouter::new("notes", NoOps).not_available(CrudOperation::Update);
        assert!(!router.is_available(CrudOperation::Update));
        assert!(router.is_available(CrudOperation::Get));
    }

    #[test]
    fn test_decode_entity_failure_is_validation_failed() {
        let rejection = decode_entity::<Probe>("probes", b"{not json").unwrap_err();
        assert_eq!(rejection.state(), crate::crud::State::ValidationFailed);
        let message = rejection.err().unwrap().to_string();
        assert!(message.starts_with(BODY_PARSE_ERROR_PREFIX));
    }

    #[test]
    fn test_decode_entity_success() {
        let probe = decode_entity::<Probe>("probes", br#"{"value": 3}"#).unwrap();
        assert_eq!(probe.value, 3);
    }

    #[test]
    fn test_panic_message_payloads() {
        let static_str: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(static_str.as_ref()), "boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }

    #[tokio::test]
    async fn test_guarded_recovers_panic() {
        let response = guarded("probes", CrudOperation::List, async {
            if true {
                panic!("handler exploded");
            }
            StatusCode::OK.into_response()
        })
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"message": PANIC_MESSAGE}));
    }

    #[tokio::test]
    async fn test_action_not_available_is_empty_405() {
        let response = action_not_available().await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }
}
