//! Request translation: transaction → positional remote arguments

use super::registry::ActionHandler;
use super::traits::ArgsBuilder;
use super::transaction::Transaction;
use serde_json::Value;

/// Params key `ParamsFlattener` looks for by default.
pub const DEFAULT_ARGS_KEY: &str = "dwrFunctionArgs";

/// Compute the leading arguments for `transaction`'s remote call.
///
/// A configured builder wins and its result is used verbatim (`None` means
/// no arguments). Without one, reads take no arguments and writes take a
/// single argument: the array of record payloads. The completion handler is
/// appended separately by the caller.
pub fn build_args(handler: &ActionHandler, transaction: &Transaction, payloads: Vec<Value>) -> Vec<Value> {
    match handler.args_builder() {
        Some(builder) => builder.build(transaction, &payloads).unwrap_or_default(),
        None if transaction.action().is_write() => vec![Value::Array(payloads)],
        None => Vec::new(),
    }
}

/// Builder that derives arguments from the request params.
///
/// If params holds `args_key`, its value supplies the arguments: an array is
/// spread in index order, an object has its values spread in insertion order,
/// and a scalar is passed as the only argument. Otherwise every param value
/// is passed in insertion order. Argument order then depends on
/// how the caller assembled params; an explicit builder is preferable
/// whenever the remote signature is known.
#[derive(Debug, Clone)]
pub struct ParamsFlattener {
    args_key: String,
}

impl ParamsFlattener {
    pub fn new(args_key: impl Into<String>) -> Self {
        Self {
            args_key: args_key.into(),
        }
    }

    pub fn args_key(&self) -> &str {
        &self.args_key
    }
}

impl Default for ParamsFlattener {
    fn default() -> Self {
        Self::new(DEFAULT_ARGS_KEY)
    }
}

impl ArgsBuilder for ParamsFlattener {
    fn build(&self, transaction: &Transaction, _payloads: &[Value]) -> Option<Vec<Value>> {
        let params = transaction.params();
        match params.get(&self.args_key) {
            Some(Value::Array(args)) => Some(args.clone()),
            Some(Value::Object(args)) => Some(args.values().cloned().collect()),
            Some(other) => Some(vec![other.clone()]),
            None => Some(params.values().cloned().collect()),
        }
    }
}
