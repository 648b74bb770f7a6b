//! Seams the proxy is built against
//!
//! The proxy owns translation and dispatch only. Remote stubs, argument
//! builders and request issuers plug in through these traits.

use super::completion::RemoteCall;
use super::engine::{Dispatch, ProxyRequest};
use super::error::ProxyError;
use super::transaction::Transaction;
use serde_json::Value;

/// A generated remote-procedure stub.
///
/// Receives the positional arguments and the trailing completion handler.
/// Must return promptly: the proxy does not wait, and completion is expected
/// later through `call.completion`, from whatever thread or task the remote
/// mechanism uses.
pub trait RemoteFunction: Send + Sync {
    fn invoke(&self, call: RemoteCall);
}

impl<F> RemoteFunction for F
where
    F: Fn(RemoteCall) + Send + Sync,
{
    fn invoke(&self, call: RemoteCall) {
        self(call)
    }
}

/// Computes the leading positional arguments for a remote call.
///
/// `self` is the builder's execution scope. `payloads` are the plain record
/// payloads of the transaction (empty for reads). Returning `None` means
/// "no arguments".
pub trait ArgsBuilder: Send + Sync {
    fn build(&self, transaction: &Transaction, payloads: &[Value]) -> Option<Vec<Value>>;
}

impl<F> ArgsBuilder for F
where
    F: Fn(&Transaction, &[Value]) -> Option<Vec<Value>> + Send + Sync,
{
    fn build(&self, transaction: &Transaction, payloads: &[Value]) -> Option<Vec<Value>> {
        self(transaction, payloads)
    }
}

/// Anything that can take a CRUD request from a grid store.
pub trait RequestHandler {
    /// Issue `request`. Returns once the remote call has been handed off (or
    /// the request was vetoed); completion arrives through the request's
    /// callback.
    fn request(&self, request: ProxyRequest) -> Result<Dispatch, ProxyError>;
}
