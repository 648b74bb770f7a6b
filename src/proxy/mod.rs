//! Remote-procedure data proxy
//!
//! Translates a grid store's CRUD requests into positional calls against
//! remote-procedure stubs, and translates the stubs' two-branch completions
//! back into one `RequestOutcome` per request plus lifecycle notifications.

mod action;
mod completion;
mod dispatch;
mod engine;
mod error;
mod events;
#[cfg(test)]
mod integration_tests;
mod registry;
mod traits;
mod transaction;
pub mod translate;

pub use action::Action;
pub use completion::{CompletionHandler, RemoteCall, RemoteFailure};
pub use dispatch::{RequestCallback, RequestOutcome, ResponseDispatcher};
pub use engine::{Dispatch, ProxyRequest, RpcProxy};
pub use error::ProxyError;
pub use events::{EventChannel, ExceptionDetail, ExceptionKind, ProxyEvent, ProxyListener, Verdict};
pub use registry::{ActionHandler, HandlerRegistry, HandlerRegistryBuilder};
pub use traits::{ArgsBuilder, RemoteFunction, RequestHandler};
pub use transaction::{record_payloads, Record, Transaction};
pub use translate::{build_args, ParamsFlattener};
