//! JsonReader: decodes already-deserialized JSON responses

use super::{DataReader, ReadResult, ReaderError};
use crate::proxy::{Action, Record};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property names the reader looks for in a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonReaderConfig {
    /// Property holding the record array
    pub root: String,
    pub success_property: String,
    pub total_property: String,
    /// Record field used as the record's identity
    pub id_property: String,
}

impl Default for JsonReaderConfig {
    fn default() -> Self {
        Self {
            root: "objectsToConvertToRecords".to_string(),
            success_property: "success".to_string(),
            total_property: "total".to_string(),
            id_property: "id".to_string(),
        }
    }
}

/// Reader for `{ "<root>": [..], "success": bool, "total": n }` responses.
#[derive(Debug, Clone, Default)]
pub struct JsonReader {
    config: JsonReaderConfig,
}

impl JsonReader {
    pub fn new(config: JsonReaderConfig) -> Self {
        Self { config }
    }

    /// Reader with a custom root and default everything else.
    pub fn with_root(root: impl Into<String>) -> Self {
        Self::new(JsonReaderConfig {
            root: root.into(),
            ..JsonReaderConfig::default()
        })
    }

    pub fn config(&self) -> &JsonReaderConfig {
        &self.config
    }

    fn as_object<'a>(&self, response: &'a Value) -> Result<&'a Map<String, Value>, ReaderError> {
        response.as_object().ok_or(ReaderError::NotAnObject)
    }

    fn success(&self, obj: &Map<String, Value>) -> Result<Option<bool>, ReaderError> {
        match obj.get(&self.config.success_property) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(ReaderError::MalformedSuccess(
                self.config.success_property.clone(),
            )),
        }
    }

    fn records(&self, rows: &[Value]) -> Result<Vec<Record>, ReaderError> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| match Record::from_value(row.clone()) {
                Some(record) => Ok(match record.get(&self.config.id_property).cloned() {
                    Some(id) => record.with_id(id),
                    None => record,
                }),
                None => Err(ReaderError::InvalidRecord(i)),
            })
            .collect()
    }

    fn block(&self, obj: &Map<String, Value>, rows: &[Value]) -> Result<ReadResult, ReaderError> {
        let mut block = ReadResult::new(self.config.root.clone(), self.records(rows)?)
            .with_success(self.success(obj)?);
        if let Some(total) = obj.get(&self.config.total_property).and_then(Value::as_u64) {
            block = block.with_total(total);
        }
        Ok(block)
    }
}

impl DataReader for JsonReader {
    fn read_records(&self, response: &Value) -> Result<ReadResult, ReaderError> {
        let obj = self.as_object(response)?;
        let rejected = self.success(obj)? == Some(false);
        match obj.get(&self.config.root) {
            Some(Value::Array(rows)) => self.block(obj, rows),
            // A rejected read may legitimately carry no rows.
            None | Some(Value::Null) if rejected => self.block(obj, &[]),
            None => Err(ReaderError::MissingRoot(self.config.root.clone())),
            Some(_) => Err(ReaderError::RootNotArray(self.config.root.clone())),
        }
    }

    fn read_response(&self, _action: Action, response: &Value) -> Result<ReadResult, ReaderError> {
        let obj = self.as_object(response)?;
        match obj.get(&self.config.root) {
            Some(Value::Array(rows)) => self.block(obj, rows),
            None | Some(Value::Null) => self.block(obj, &[]),
            Some(_) => Err(ReaderError::RootNotArray(self.config.root.clone())),
        }
    }
}
