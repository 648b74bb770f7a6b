//! Records and the per-request transaction bundle

use super::action::Action;
use crate::reader::DataReader;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A record handle as the grid sees it.
///
/// `data` is the flat field-to-value payload sent to the server on writes.
/// `id` is the record's identity when the reader could find one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    pub id: Option<Value>,
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { id: None, data }
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Build a record from a JSON object. Returns `None` for anything else.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(data) => Some(Self::new(data)),
            _ => None,
        }
    }

    /// The underlying plain data payload.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

/// Map record handles to their plain payloads, one-to-one and in order.
pub fn record_payloads(records: &[Record]) -> Vec<Value> {
    records.iter().map(|r| Value::Object(r.data().clone())).collect()
}

/// Everything one in-flight request needs, captured at issue time.
///
/// Built once per request and shared read-only between the argument
/// builder and the completion closure. The caller's callback is not part of
/// the bundle: the dispatcher owns it so that it can be consumed exactly once.
pub struct Transaction {
    id: Uuid,
    action: Action,
    records: Vec<Record>,
    params: Map<String, Value>,
    reader: Arc<dyn DataReader>,
    options: Value,
    issued_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        action: Action,
        records: Vec<Record>,
        params: Map<String, Value>,
        reader: Arc<dyn DataReader>,
        options: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            records,
            params,
            reader,
            options,
            issued_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Records handed in by the caller. Empty for reads.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn reader(&self) -> &dyn DataReader {
        self.reader.as_ref()
    }

    /// Opaque caller value, handed back untouched in the outcome.
    pub fn options(&self) -> &Value {
        &self.options
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn payloads(&self) -> Vec<Value> {
        record_payloads(&self.records)
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("action", &self.action)
            .field("records", &self.records.len())
            .field("params", &self.params)
            .field("options", &self.options)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
