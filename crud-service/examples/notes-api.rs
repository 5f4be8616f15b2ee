//! Notes API Example - An in-memory CRUD resource
//!
//! Shows a complete resource: entity validation and formatting, list
//! constraints driven by configuration, and the NotFound / Conflict /
//! ValidationFailed answers. A second, read-only resource demonstrates
//! operations that are deliberately not available.
//!
//! Run with: cargo run --example notes-api
//!
//! The service runs on port 8080 by default (configurable via CRUD_SERVICE__PORT)
//!
//! Test with:
//!   curl -X POST http://localhost:8080/notes -d '{"title": "Buy milk"}'
//!   curl 'http://localhost:8080/notes?pageSize=5&sortDirection=desc'
//!   curl 'http://localhost:8080/notes?filters=%7B%22title%22%3A%22Buy%20milk%22%7D'
//!   curl http://localhost:8080/notes/1
//!   curl -X PUT http://localhost:8080/notes/1 -d '{"title": "Buy oat milk", "done": true}'
//!   curl -X DELETE http://localhost:8080/notes/1
//!   curl http://localhost:8080/priorities
//!   curl -X POST http://localhost:8080/priorities -d '{}'   # 405

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crud_service::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Note {
    #[serde(default)]
    id: u64,
    title: String,
    #[serde(default)]
    done: bool,
}

impl Entity for Note {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::new("Invalid note").with_field_error("title", "required"));
        }
        if self.title.len() > 200 {
            return Err(ValidationError::new("Invalid note")
                .with_field_error("title", "at most 200 characters"));
        }
        Ok(())
    }

    fn format(&mut self, is_new: bool) {
        self.title = self.title.trim().to_string();
        if is_new {
            self.done = false;
        }
    }
}

struct NotesService {
    paging: PagingConfig,
    notes: RwLock<BTreeMap<u64, Note>>,
    next_id: AtomicU64,
}

impl NotesService {
    fn new(paging: PagingConfig) -> Self {
        Self {
            paging,
            notes: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Service for NotesService {
    type Entity = Note;
    type Item = Note;
    type Created = u64;

    fn constrain_request(&self, request: &mut DataSetRequest) {
        self.paging.apply(request);
        request.constrain_sort_columns("id", &["id", "title"]);
        request.constrain_filter_columns(&["title"]);
    }

    async fn get_all(&self, request: DataSetRequest) -> OperationResult<DataSet<Note>> {
        let notes = self.notes.read().await;

        let mut items: Vec<Note> = notes
            .values()
            .filter(|note| {
                request
                    .filter("title")
                    .map_or(true, |title| note.title.starts_with(title))
            })
            .cloned()
            .collect();

        if request.sort_column == "title" {
            items.sort_by(|a, b| a.title.cmp(&b.title));
        }
        if request.sort_direction == SortDirection::Desc {
            items.reverse();
        }

        let total = items.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let page = items
            .into_iter()
            .skip(offset)
            .take(request.page_size as usize)
            .collect();

        OperationResult::ok(DataSet::new(page, PagingInfo::paged(&request, Some(total))))
    }

    async fn get_by_id(&self, id: EntityKey) -> OperationResult<Note> {
        let Ok(id) = id.parse::<u64>() else {
            return OperationResult::not_found();
        };
        match self.notes.read().await.get(&id) {
            Some(note) => OperationResult::ok(note.clone()),
            None => OperationResult::not_found(),
        }
    }

    async fn add(&self, mut note: Note) -> OperationResult<u64> {
        if let Err(error) = note.prepare(true) {
            return error.into();
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        note.id = id;
        self.notes.write().await.insert(id, note);
        tracing::info!(id, "note created");
        OperationResult::ok(id)
    }

    async fn update(&self, id: EntityKey, mut note: Note) -> OperationResult<Note> {
        let Ok(id) = id.parse::<u64>() else {
            return OperationResult::not_found();
        };
        if let Err(error) = note.prepare(false) {
            return error.into();
        }

        let mut notes = self.notes.write().await;
        let Some(existing) = notes.get_mut(&id) else {
            return OperationResult::not_found();
        };
        if existing.done && note.done {
            return OperationResult::conflict(anyhow::anyhow!("Note {id} is already done"));
        }
        note.id = id;
        *existing = note.clone();
        OperationResult::ok(note)
    }

    async fn delete(&self, id: EntityKey) -> OperationResult<()> {
        let Ok(id) = id.parse::<u64>() else {
            return OperationResult::not_found();
        };
        match self.notes.write().await.remove(&id) {
            Some(_) => OperationResult::ok(None),
            None => OperationResult::not_found(),
        }
    }
}

/// Fixed lookup table
struct PrioritiesService;

impl Service for PrioritiesService {
    type Entity = Note;
    type Item = &'static str;
    type Created = ();

    async fn get_all(&self, _request: DataSetRequest) -> OperationResult<DataSet<&'static str>> {
        let items = vec!["low", "normal", "high"];
        let paging = PagingInfo::single_page(items.len());
        OperationResult::ok(DataSet::new(items, paging))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let notes = ResourceRouter::new("notes", NotesService::new(config.paging)).into_router();
    let priorities = ResourceRouter::new("priorities", PrioritiesService)
        .not_available(CrudOperation::Get)
        .into_router();

    let app = Router::new().merge(notes).merge(priorities);

    Server::new(config).serve(app).await
}
