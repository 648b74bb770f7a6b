//! Readers decode raw remote responses into record blocks
//!
//! The proxy never interprets a response itself. It hands the payload to the
//! `DataReader` supplied with the request and acts on the decoded
//! `ReadResult`. `JsonReader` is the reader for the conventional response
//! shape `{ "<root>": [..], "success": bool }`.

mod json;

pub use json::{JsonReader, JsonReaderConfig};

use crate::proxy::{Action, Record};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors a reader raises on a malformed response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReaderError {
    #[error("response is not an object")]
    NotAnObject,
    #[error("response has no root property '{0}'")]
    MissingRoot(String),
    #[error("root property '{0}' is not an array")]
    RootNotArray(String),
    #[error("record at index {0} is not an object")]
    InvalidRecord(usize),
    #[error("success property '{0}' is not a boolean")]
    MalformedSuccess(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A decoded block of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadResult {
    /// The response's success flag, if it carried one.
    pub success: Option<bool>,
    pub records: Vec<Record>,
    /// Total record count reported by the server, for paging.
    pub total: Option<u64>,
    /// Name of the response property the records were read from.
    pub root: String,
}

impl ReadResult {
    pub fn new(root: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            success: Some(true),
            records,
            total: None,
            root: root.into(),
        }
    }

    pub fn with_success(mut self, success: Option<bool>) -> Self {
        self.success = success;
        self
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// True only when the server explicitly reported `success: false`.
    /// A missing flag is not a rejection.
    pub fn is_rejected(&self) -> bool {
        self.success == Some(false)
    }
}

/// Decoding capability supplied per request.
pub trait DataReader: Send + Sync {
    /// Decode the response to a read request.
    fn read_records(&self, response: &Value) -> Result<ReadResult, ReaderError>;

    /// Decode the response to a create, update or destroy request.
    fn read_response(&self, action: Action, response: &Value) -> Result<ReadResult, ReaderError>;
}
