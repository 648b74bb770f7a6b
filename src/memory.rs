//! In-memory employee services
//!
//! Stand-in servers for demos and end-to-end tests, answering in the reader
//! response shape `{ "objectsToConvertToRecords": [..], "success": bool }`:
//! - `CrudService`: stored employees; the first read seeds ten of them
//! - `GridDataService`: a stateless read generating rows from its arguments

use crate::proxy::{Action, ActionHandler, HandlerRegistry, RemoteFailure};
use crate::remote::{RemoteService, TokioRemote};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Response property holding the employee rows.
pub const RESPONSE_ROOT: &str = "objectsToConvertToRecords";

const SEED_ROWS: usize = 10;

/// Longest name prefix `GridDataService` keeps, in characters.
pub const MAX_PREFIX_CHARS: usize = 10;

/// Upper bound on the rows `GridDataService` generates per call.
pub const MAX_GRID_ROWS: i64 = 1000;

#[derive(Debug, Default)]
pub struct CrudService {
    employees: DashMap<u64, Map<String, Value>>,
    next_id: AtomicU64,
    seeded: OnceLock<()>,
    unavailable: AtomicBool,
}

impl CrudService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// While set, every call fails on the transport path.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<Map<String, Value>> {
        self.employees.get(&id).map(|e| e.clone())
    }

    /// A remote function serving `action`.
    pub fn remote(self: &Arc<Self>, action: Action) -> TokioRemote {
        TokioRemote::new(Arc::new(CrudMethod {
            service: self.clone(),
            action,
        }))
    }

    /// Registry wiring all four actions with default argument handling.
    pub fn registry(self: &Arc<Self>) -> HandlerRegistry {
        Action::ALL
            .into_iter()
            .fold(HandlerRegistry::builder(), |builder, action| {
                builder.handler(action, ActionHandler::new(self.remote(action)))
            })
            .build()
    }

    /// Serve one call synchronously.
    pub fn handle(&self, action: Action, args: &[Value]) -> Result<Value, RemoteFailure> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RemoteFailure::new("service unavailable")
                .with_exception(json!({"name": "ServiceUnavailable"})));
        }
        let rows = match action {
            Action::Read => Some(self.read()),
            Action::Create => employee_rows(args).map(|rows| self.create(rows)),
            Action::Update => employee_rows(args).and_then(|rows| self.update(rows)),
            Action::Destroy => employee_rows(args).and_then(|rows| self.destroy(rows)),
        };
        Ok(match rows {
            Some(rows) => json!({ RESPONSE_ROOT: rows, "success": true }),
            None => json!({ RESPONSE_ROOT: null, "success": false }),
        })
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    // Concurrent first readers block until every seed row is stored.
    fn read(&self) -> Vec<Value> {
        self.seeded.get_or_init(|| {
            for _ in 0..SEED_ROWS {
                let id = self.next_id();
                self.employees.insert(id, employee(id, ""));
            }
        });
        let mut rows: Vec<(u64, Map<String, Value>)> = self
            .employees
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        rows.into_iter().map(|(_, row)| Value::Object(row)).collect()
    }

    fn create(&self, rows: Vec<Map<String, Value>>) -> Vec<Value> {
        rows.into_iter()
            .map(|mut row| {
                let id = self.next_id();
                row.insert("id".into(), json!(id));
                self.employees.insert(id, row.clone());
                Value::Object(row)
            })
            .collect()
    }

    // Rows naming unknown employees reject the whole batch.
    fn update(&self, rows: Vec<Map<String, Value>>) -> Option<Vec<Value>> {
        let ids = known_ids(&self.employees, &rows)?;
        Some(
            ids.into_iter()
                .zip(rows)
                .map(|(id, row)| {
                    self.employees.insert(id, row.clone());
                    Value::Object(row)
                })
                .collect(),
        )
    }

    fn destroy(&self, rows: Vec<Map<String, Value>>) -> Option<Vec<Value>> {
        let ids = known_ids(&self.employees, &rows)?;
        Some(
            ids.into_iter()
                .filter_map(|id| self.employees.remove(&id))
                .map(|(_, row)| Value::Object(row))
                .collect(),
        )
    }
}

fn employee(id: u64, prefix: &str) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("id".into(), json!(id));
    row.insert("firstName".into(), json!(format!("{}FirstName{}", prefix, id)));
    row.insert("lastName".into(), json!(format!("{}LastName{}", prefix, id)));
    row
}

fn employee_rows(args: &[Value]) -> Option<Vec<Map<String, Value>>> {
    match args.first()? {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_object().cloned())
            .collect(),
        _ => None,
    }
}

fn known_ids(store: &DashMap<u64, Map<String, Value>>, rows: &[Map<String, Value>]) -> Option<Vec<u64>> {
    rows.iter()
        .map(|row| row.get("id").and_then(Value::as_u64).filter(|id| store.contains_key(id)))
        .collect()
}

struct CrudMethod {
    service: Arc<CrudService>,
    action: Action,
}

#[async_trait]
impl RemoteService for CrudMethod {
    async fn call(&self, args: Vec<Value>) -> Result<Value, RemoteFailure> {
        self.service.handle(self.action, &args)
    }
}

/// Stateless read service: `(baseString, numberOfRows)` → generated rows.
///
/// The prefix is cut to its first [`MAX_PREFIX_CHARS`] characters (null or
/// missing reads as empty) and the row count is clamped to
/// `1..=MAX_GRID_ROWS`. Row `i` is `{id: i, firstName: prefix + "FirstName" + i,
/// lastName: prefix + "LastName" + i}`. A row count that is not an integer
/// fails on the transport path, as an argument conversion error would.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridDataService;

impl GridDataService {
    /// A remote function serving grid reads.
    pub fn remote() -> TokioRemote {
        TokioRemote::new(Arc::new(Self))
    }

    pub fn handle(&self, args: &[Value]) -> Result<Value, RemoteFailure> {
        let prefix: String = match args.first() {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
        .chars()
        .take(MAX_PREFIX_CHARS)
        .collect();
        let requested = args.get(1).and_then(row_count).ok_or_else(|| {
            RemoteFailure::new("numberOfRows is not an integer")
                .with_exception(json!({"name": "ConversionError"}))
        })?;
        let count = requested.clamp(1, MAX_GRID_ROWS) as u64;
        let rows: Vec<Value> = (0..count)
            .map(|i| Value::Object(employee(i, &prefix)))
            .collect();
        Ok(json!({ RESPONSE_ROOT: rows, "success": true }))
    }
}

fn row_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl RemoteService for GridDataService {
    async fn call(&self, args: Vec<Value>) -> Result<Value, RemoteFailure> {
        self.handle(&args)
    }
}
