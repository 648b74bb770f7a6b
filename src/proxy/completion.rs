//! Two-branch completion handler handed to remote functions
//!
//! Remote stubs report back through a success branch (raw response) or an
//! error branch (message plus optional exception). Internally both branches
//! feed one continuation taking `Result<Value, RemoteFailure>`.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// A failed remote call: the call itself did not complete, as opposed to
/// the server answering with `success: false`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteFailure {
    pub message: String,
    pub exception: Option<Value>,
}

impl RemoteFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exception: None,
        }
    }

    pub fn with_exception(mut self, exception: Value) -> Self {
        self.exception = Some(exception);
        self
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

type Continuation = Box<dyn FnOnce(Result<Value, RemoteFailure>) + Send>;

/// The completion object a remote function must call exactly once.
///
/// Both branches consume the handler, so a second completion cannot be
/// expressed. A handler dropped without firing never reaches the caller.
pub struct CompletionHandler {
    transaction_id: Uuid,
    continuation: Option<Continuation>,
}

impl CompletionHandler {
    pub fn new(
        transaction_id: Uuid,
        continuation: impl FnOnce(Result<Value, RemoteFailure>) + Send + 'static,
    ) -> Self {
        Self {
            transaction_id,
            continuation: Some(Box::new(continuation)),
        }
    }

    pub fn transaction_id(&self) -> Uuid {
        self.transaction_id
    }

    /// Success branch: the remote call returned `response`.
    pub fn success(self, response: Value) {
        self.complete(Ok(response));
    }

    /// Error branch: the remote call itself failed.
    pub fn error(self, message: impl Into<String>, exception: Option<Value>) {
        self.complete(Err(RemoteFailure {
            message: message.into(),
            exception,
        }));
    }

    /// Route a `Result` to the matching branch.
    pub fn complete(mut self, result: Result<Value, RemoteFailure>) {
        if let Some(continuation) = self.continuation.take() {
            continuation(result);
        }
    }
}

impl Drop for CompletionHandler {
    fn drop(&mut self) {
        if self.continuation.is_some() {
            tracing::warn!(
                transaction = %self.transaction_id,
                "remote function dropped its completion handler without calling back"
            );
        }
    }
}

impl fmt::Debug for CompletionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHandler")
            .field("transaction_id", &self.transaction_id)
            .field("pending", &self.continuation.is_some())
            .finish()
    }
}

/// One invocation of a remote function.
///
/// `args` are the leading positional arguments; `completion` always trails
/// them, whatever the action and whether or not an argument builder ran.
#[derive(Debug)]
pub struct RemoteCall {
    pub args: Vec<Value>,
    pub completion: CompletionHandler,
}

impl RemoteCall {
    pub fn new(args: Vec<Value>, completion: CompletionHandler) -> Self {
        Self { args, completion }
    }

    /// Number of positional arguments including the trailing completion handler.
    pub fn arity(&self) -> usize {
        self.args.len() + 1
    }

    pub fn into_parts(self) -> (Vec<Value>, CompletionHandler) {
        (self.args, self.completion)
    }
}
