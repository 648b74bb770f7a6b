//! rpc-proxy: grid data proxy over remote-procedure stubs
//!
//! A data-grid store asks its proxy to read, create, update or destroy
//! records. `RpcProxy` serves those requests by calling generated remote
//! stubs with positional arguments instead of issuing HTTP requests, and
//! reports each completion back as a single `RequestOutcome`.
//!
//! # Core Concepts
//!
//! - **Handler registry**: action → remote function (+ optional argument builder)
//! - **Transaction**: immutable bundle of one request's inputs
//! - **Dispatcher**: turns a remote completion into notifications and one callback
//!
//! # Example
//!
//! ```
//! use rpc_proxy::{Action, ActionHandler, HandlerRegistry, JsonReader, RemoteCall, RpcProxy};
//! use serde_json::{json, Map, Value};
//! use std::sync::Arc;
//!
//! let registry = HandlerRegistry::builder()
//!     .handler(
//!         Action::Read,
//!         ActionHandler::new(|call: RemoteCall| {
//!             call.completion.success(json!({"success": true, "rows": [{"id": 1}]}))
//!         }),
//!     )
//!     .build();
//! let proxy = RpcProxy::with_registry(registry);
//!
//! proxy
//!     .do_request(
//!         Action::Read,
//!         vec![],
//!         Map::new(),
//!         Arc::new(JsonReader::with_root("rows")),
//!         |outcome| assert!(outcome.success),
//!         Value::Null,
//!     )
//!     .unwrap();
//! ```

pub mod config;
pub mod memory;
pub mod proxy;
pub mod reader;
pub mod remote;

pub use config::{ConfigError, ProxyConfig};
pub use proxy::{
    Action, ActionHandler, ArgsBuilder, CompletionHandler, Dispatch, EventChannel,
    ExceptionDetail, ExceptionKind, HandlerRegistry, ParamsFlattener, ProxyError, ProxyEvent,
    ProxyListener, ProxyRequest, Record, RemoteCall, RemoteFailure, RemoteFunction,
    RequestHandler, RequestOutcome, RpcProxy, Transaction, Verdict,
};
pub use reader::{DataReader, JsonReader, JsonReaderConfig, ReadResult, ReaderError};
pub use remote::{FnRemote, RemoteService, TokioRemote};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
