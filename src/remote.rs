//! Remote function adapters
//!
//! Two ways to put a callable behind the proxy's `RemoteFunction` seam:
//! - `FnRemote`: a synchronous closure, completed inline (tests, local stubs)
//! - `TokioRemote`: an async service, completed later from a spawned task

use crate::proxy::{RemoteCall, RemoteFailure, RemoteFunction};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A synchronous remote stub. The completion fires before `invoke` returns.
pub struct FnRemote<F> {
    f: F,
}

impl<F> FnRemote<F>
where
    F: Fn(Vec<Value>) -> Result<Value, RemoteFailure> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> RemoteFunction for FnRemote<F>
where
    F: Fn(Vec<Value>) -> Result<Value, RemoteFailure> + Send + Sync,
{
    fn invoke(&self, call: RemoteCall) {
        let (args, completion) = call.into_parts();
        completion.complete((self.f)(args));
    }
}

/// An asynchronous remote service.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn call(&self, args: Vec<Value>) -> Result<Value, RemoteFailure>;
}

/// Runs a `RemoteService` on the current tokio runtime.
///
/// `invoke` spawns and returns immediately; completions of concurrent calls
/// arrive in whatever order the tasks finish. Invoked outside a runtime, the
/// call fails through the error branch.
pub struct TokioRemote {
    service: Arc<dyn RemoteService>,
}

impl TokioRemote {
    pub fn new(service: Arc<dyn RemoteService>) -> Self {
        Self { service }
    }
}

impl RemoteFunction for TokioRemote {
    fn invoke(&self, call: RemoteCall) {
        let (args, completion) = call.into_parts();
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                completion.error(format!("no tokio runtime: {}", e), None);
                return;
            }
        };
        let service = self.service.clone();
        handle.spawn(async move {
            let result = service.call(args).await;
            completion.complete(result);
        });
    }
}

impl fmt::Debug for TokioRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioRemote").finish_non_exhaustive()
    }
}
