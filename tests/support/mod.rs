#![allow(dead_code)]

//! Test doubles for the backend: an in-process `FakeRemote` with failure and
//! latency injection, and a small axum server speaking the real REST shape.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{Map, Value};

use expense_tracker::client::session::Identity;
use expense_tracker::models::{EntityKind, ExpenseForm, RecordId};
use expense_tracker::store::Entity;
use expense_tracker::{App, ClientConfig, FinanceError, Remote};

// ============= FakeRemote =============

#[derive(Default)]
struct FakeState {
    records: HashMap<(EntityKind, String), Vec<Value>>,
    failing: HashSet<EntityKind>,
    down: bool,
    delay: Option<Duration>,
    omit_ids: bool,
    quiet_updates: bool,
    next_id: u64,
    calls: usize,
}

/// Backend stand-in keyed by (kind, owner). Clones share state, so a test can
/// keep a handle after moving one into an `App`.
#[derive(Clone, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed<T: Entity>(&self, owner: &str, records: Vec<T>) {
        let mut state = self.state.lock().unwrap();
        let bucket = state
            .records
            .entry((T::KIND, owner.to_string()))
            .or_default();
        bucket.extend(records.iter().map(|r| serde_json::to_value(r).unwrap()));
    }

    pub fn records_of<T: Entity>(&self, owner: &str) -> Vec<T> {
        let state = self.state.lock().unwrap();
        state
            .records
            .get(&(T::KIND, owner.to_string()))
            .map(|values| {
                values
                    .iter()
                    .map(|v| serde_json::from_value(v.clone()).unwrap())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every call touching `kind` fails until `heal` is called.
    pub fn fail(&self, kind: EntityKind) {
        self.state.lock().unwrap().failing.insert(kind);
    }

    pub fn heal(&self, kind: EntityKind) {
        self.state.lock().unwrap().failing.remove(&kind);
    }

    pub fn set_down(&self, down: bool) {
        self.state.lock().unwrap().down = down;
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        self.state.lock().unwrap().delay = delay;
    }

    /// Created records come back without an id, like a backend that does not assign one.
    pub fn omit_ids(&self) {
        self.state.lock().unwrap().omit_ids = true;
    }

    /// Updates succeed with an empty reply instead of the stored record.
    pub fn quiet_updates(&self) {
        self.state.lock().unwrap().quiet_updates = true;
    }

    /// Overwrites a field of a stored record, as a backend normalizing it would.
    pub fn rewrite<T: Entity>(&self, id: &RecordId, field: &str, value: Value) {
        let mut state = self.state.lock().unwrap();
        if let Some((values, pos)) = Self::find_mut(&mut state, T::KIND, id) {
            values[pos][field] = value;
        }
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    /// Counts the call and returns the delay to apply, or the injected failure.
    fn enter(&self, kind: EntityKind, op: &str) -> Result<Option<Duration>, FinanceError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.down || state.failing.contains(&kind) {
            return Err(FinanceError::remote(format!("{op} {kind}: connection refused")));
        }
        Ok(state.delay)
    }

    async fn pause(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn find_mut<'a>(
        state: &'a mut FakeState,
        kind: EntityKind,
        id: &RecordId,
    ) -> Option<(&'a mut Vec<Value>, usize)> {
        state
            .records
            .iter_mut()
            .filter(|((k, _), _)| *k == kind)
            .find_map(|(_, values)| {
                let pos = values
                    .iter()
                    .position(|v| v.get("id").and_then(Value::as_str) == Some(id.as_str()))?;
                Some((values, pos))
            })
    }
}

#[async_trait]
impl Remote for FakeRemote {
    async fn list<T: Entity>(&self, owner: &Identity) -> Result<Vec<T>, FinanceError> {
        let delay = self.enter(T::KIND, "GET")?;
        Self::pause(delay).await;
        let values = {
            let state = self.state.lock().unwrap();
            state
                .records
                .get(&(T::KIND, owner.as_str().to_string()))
                .cloned()
                .unwrap_or_default()
        };
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(|e| FinanceError::remote(e.to_string())))
            .collect()
    }

    async fn create<T: Entity>(&self, owner: &Identity, record: &T) -> Result<T, FinanceError> {
        let delay = self.enter(T::KIND, "POST")?;
        Self::pause(delay).await;
        let mut value = serde_json::to_value(record).map_err(|e| FinanceError::remote(e.to_string()))?;
        let stored = {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            if !state.omit_ids {
                value["id"] = Value::String(format!("srv-{}", state.next_id));
            }
            state
                .records
                .entry((T::KIND, owner.as_str().to_string()))
                .or_default()
                .push(value.clone());
            value
        };
        serde_json::from_value(stored).map_err(|e| FinanceError::remote(e.to_string()))
    }

    async fn update<T: Entity>(
        &self,
        id: &RecordId,
        patch: &T::Patch,
    ) -> Result<Option<T>, FinanceError> {
        let delay = self.enter(T::KIND, "PUT")?;
        Self::pause(delay).await;
        let patch = serde_json::to_value(patch).map_err(|e| FinanceError::remote(e.to_string()))?;
        let mut state = self.state.lock().unwrap();
        let quiet = state.quiet_updates;
        let (values, pos) = Self::find_mut(&mut state, T::KIND, id).ok_or_else(|| {
            FinanceError::NotFound {
                kind: T::KIND,
                id: id.clone(),
            }
        })?;
        if let (Some(target), Some(fields)) = (values[pos].as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        if quiet {
            return Ok(None);
        }
        serde_json::from_value(values[pos].clone())
            .map(Some)
            .map_err(|e| FinanceError::remote(e.to_string()))
    }

    async fn delete<T: Entity>(&self, id: &RecordId) -> Result<(), FinanceError> {
        let delay = self.enter(T::KIND, "DELETE")?;
        Self::pause(delay).await;
        let mut state = self.state.lock().unwrap();
        let (values, pos) = Self::find_mut(&mut state, T::KIND, id).ok_or_else(|| {
            FinanceError::NotFound {
                kind: T::KIND,
                id: id.clone(),
            }
        })?;
        values.remove(pos);
        Ok(())
    }
}

pub fn config() -> ClientConfig {
    ClientConfig {
        request_timeout: Duration::from_millis(200),
        ..ClientConfig::default()
    }
}

pub fn app(remote: &FakeRemote) -> App<FakeRemote> {
    App::new(remote.clone(), config())
}

pub fn expense(title: &str, amount: &str, category: &str) -> ExpenseForm {
    ExpenseForm {
        title: title.to_string(),
        amount: amount.to_string(),
        category: category.to_string(),
        date: "2025-03-01".to_string(),
    }
}

// ============= Mock HTTP backend =============

#[derive(Clone, Default)]
pub struct MockState {
    collections: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    /// Collections answering 500.
    broken: Arc<Mutex<HashSet<String>>>,
    /// Collections answering 200 with a body that is not JSON.
    garbled: Arc<Mutex<HashSet<String>>>,
    /// Fields the server sets on every updated record.
    stamps: Arc<Mutex<Map<String, Value>>>,
    next_id: Arc<Mutex<u64>>,
}

impl MockState {
    pub fn break_collection(&self, collection: &str) {
        self.broken.lock().unwrap().insert(collection.to_string());
    }

    pub fn garble_collection(&self, collection: &str) {
        self.garbled.lock().unwrap().insert(collection.to_string());
    }

    pub fn stamp_updates(&self, field: &str, value: Value) {
        self.stamps.lock().unwrap().insert(field.to_string(), value);
    }

    pub fn insert(&self, collection: &str, record: Value) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    pub fn all(&self, collection: &str) -> Vec<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn refuse(&self, collection: &str) -> Option<Response> {
        if self.broken.lock().unwrap().contains(collection) {
            return Some((StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response());
        }
        if self.garbled.lock().unwrap().contains(collection) {
            return Some((StatusCode::OK, "<html>not json</html>").into_response());
        }
        None
    }
}

async fn list_records(
    State(state): State<MockState>,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(resp) = state.refuse(&collection) {
        return resp;
    }
    let owner = params.get("owner").cloned().unwrap_or_default();
    let records: Vec<Value> = state
        .all(&collection)
        .into_iter()
        .filter(|r| r.get("owner").and_then(Value::as_str) == Some(owner.as_str()))
        .collect();
    Json(records).into_response()
}

async fn create_record(
    State(state): State<MockState>,
    Path(collection): Path<String>,
    Json(mut record): Json<Value>,
) -> Response {
    if let Some(resp) = state.refuse(&collection) {
        return resp;
    }
    let id = {
        let mut next = state.next_id.lock().unwrap();
        *next += 1;
        *next
    };
    if let Some(fields) = record.as_object_mut() {
        fields.entry("id").or_insert_with(|| Value::String(id.to_string()));
    }
    state.insert(&collection, record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update_record(
    State(state): State<MockState>,
    Path((collection, id)): Path<(String, String)>,
    Json(patch): Json<Map<String, Value>>,
) -> Response {
    if let Some(resp) = state.refuse(&collection) {
        return resp;
    }
    let stamps = state.stamps.lock().unwrap().clone();
    let mut collections = state.collections.lock().unwrap();
    let record = collections
        .get_mut(&collection)
        .and_then(|records| records.iter_mut().find(|r| id_of(r) == id));
    match record.and_then(Value::as_object_mut) {
        Some(fields) => {
            fields.extend(patch);
            fields.extend(stamps);
            Json(Value::Object(fields.clone())).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_record(
    State(state): State<MockState>,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    if let Some(resp) = state.refuse(&collection) {
        return resp;
    }
    let mut collections = state.collections.lock().unwrap();
    let Some(records) = collections.get_mut(&collection) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match records.iter().position(|r| id_of(r) == id) {
        Some(pos) => {
            records.remove(pos);
            StatusCode::OK.into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Ids may be stored as strings or numbers.
fn id_of(record: &Value) -> String {
    match record.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn api_routes() -> Router<MockState> {
    Router::new()
        .route("/api/:collection", get(list_records).post(create_record))
        .route("/api/:collection/:id", put(update_record).delete(delete_record))
}

/// Starts the mock backend on an ephemeral port. Returns its `/api` base URL.
pub async fn spawn_backend() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/health", get(|| async { "Backend is running" }))
        .merge(api_routes())
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api"), state)
}

/// Serializes a record the way the client would, minus the owner.
pub fn json_of<T: Entity>(record: &T) -> Value {
    serde_json::to_value(record).unwrap()
}
