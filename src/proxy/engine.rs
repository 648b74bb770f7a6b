//! RpcProxy: the request entry point
//!
//! Looks up the action's handler, builds the transaction, offers the
//! request to `Before*` listeners, translates it into positional remote
//! arguments and hands it to the remote function together with a fresh
//! completion handler. Returns as soon as the remote function does.

use super::action::Action;
use super::completion::{CompletionHandler, RemoteCall};
use super::dispatch::{RequestCallback, RequestOutcome, ResponseDispatcher};
use super::error::ProxyError;
use super::events::{EventChannel, ProxyEvent, Verdict};
use super::registry::HandlerRegistry;
use super::traits::RequestHandler;
use super::transaction::{Record, Transaction};
use super::translate::build_args;
use crate::config::ProxyConfig;
use crate::reader::DataReader;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use uuid::Uuid;

/// How a request left the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Handed to the remote function; the callback fires on completion.
    Issued(Uuid),
    /// A `Before*` listener vetoed; the callback has already fired with failure.
    Vetoed,
}

/// One CRUD request from a store.
pub struct ProxyRequest {
    action: Action,
    records: Vec<Record>,
    params: Map<String, Value>,
    reader: Arc<dyn DataReader>,
    callback: RequestCallback,
    options: Value,
}

impl ProxyRequest {
    pub fn new(
        action: Action,
        reader: Arc<dyn DataReader>,
        callback: impl FnOnce(RequestOutcome) + Send + 'static,
    ) -> Self {
        Self {
            action,
            records: Vec::new(),
            params: Map::new(),
            reader,
            callback: Box::new(callback),
            options: Value::Null,
        }
    }

    pub fn records(mut self, records: Vec<Record>) -> Self {
        self.records = records;
        self
    }

    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    pub fn options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    pub fn action(&self) -> Action {
        self.action
    }
}

impl fmt::Debug for ProxyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyRequest")
            .field("action", &self.action)
            .field("records", &self.records.len())
            .field("params", &self.params)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Data proxy backed by remote-procedure stubs.
pub struct RpcProxy {
    registry: HandlerRegistry,
    events: Arc<EventChannel>,
    config: ProxyConfig,
}

impl RpcProxy {
    /// Build a proxy, checking that every `config.required_actions` entry
    /// has a handler.
    pub fn new(registry: HandlerRegistry, config: ProxyConfig) -> Result<Self, ProxyError> {
        if let Some(missing) = config
            .required_actions
            .iter()
            .find(|a| !registry.contains(**a))
        {
            return Err(ProxyError::NoHandler(*missing));
        }
        Ok(Self {
            registry,
            events: Arc::new(EventChannel::new()),
            config,
        })
    }

    /// Proxy with the default configuration.
    pub fn with_registry(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            events: Arc::new(EventChannel::new()),
            config: ProxyConfig::default(),
        }
    }

    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Positional form of [`RequestHandler::request`].
    pub fn do_request(
        &self,
        action: Action,
        records: Vec<Record>,
        params: Map<String, Value>,
        reader: Arc<dyn DataReader>,
        callback: impl FnOnce(RequestOutcome) + Send + 'static,
        options: Value,
    ) -> Result<Dispatch, ProxyError> {
        self.request(
            ProxyRequest::new(action, reader, callback)
                .records(records)
                .params(params)
                .options(options),
        )
    }

    /// Issue a request and wait for its outcome.
    ///
    /// Configuration errors are returned before anything is issued. If the
    /// remote function drops its completion handler without calling back,
    /// this returns `ProxyError::Abandoned`.
    pub async fn execute(
        &self,
        action: Action,
        records: Vec<Record>,
        params: Map<String, Value>,
        reader: Arc<dyn DataReader>,
        options: Value,
    ) -> Result<RequestOutcome, ProxyError> {
        let (tx, rx) = oneshot::channel();
        let request = ProxyRequest::new(action, reader, move |outcome| {
            // The receiver only goes away if the awaiting future was dropped.
            let _ = tx.send(outcome);
        })
        .records(records)
        .params(params)
        .options(options);

        let dispatch = self.request(request)?;
        rx.await.map_err(|_| match dispatch {
            Dispatch::Issued(id) => ProxyError::Abandoned(id),
            Dispatch::Vetoed => ProxyError::Abandoned(Uuid::nil()),
        })
    }

    fn before_request(&self, transaction: &Transaction) -> Verdict {
        if !self.config.before_request_events {
            return Verdict::Proceed;
        }
        let event = match transaction.action() {
            Action::Read => ProxyEvent::BeforeLoad {
                transaction_id: transaction.id(),
                params: transaction.params().clone(),
                options: transaction.options().clone(),
            },
            action => ProxyEvent::BeforeWrite {
                transaction_id: transaction.id(),
                action,
                records: transaction.records().to_vec(),
                params: transaction.params().clone(),
                options: transaction.options().clone(),
            },
        };
        self.events.publish_vetoable(&event)
    }
}

impl RequestHandler for RpcProxy {
    fn request(&self, request: ProxyRequest) -> Result<Dispatch, ProxyError> {
        let handler = self.registry.get(request.action)?;

        let ProxyRequest {
            action,
            records,
            params,
            reader,
            callback,
            options,
        } = request;
        let transaction = Arc::new(Transaction::new(action, records, params, reader, options));

        if self.before_request(&transaction) == Verdict::Veto {
            tracing::debug!(transaction = %transaction.id(), %action, "request vetoed");
            callback(RequestOutcome::failed(&transaction));
            return Ok(Dispatch::Vetoed);
        }

        let args = build_args(handler, &transaction, transaction.payloads());
        let id = transaction.id();
        let dispatcher = ResponseDispatcher::new(
            transaction,
            self.events.clone(),
            callback,
            self.config.emits_legacy_load_exception(),
        );
        let completion = CompletionHandler::new(id, move |result| dispatcher.complete(result));
        let call = RemoteCall::new(args, completion);

        tracing::debug!(transaction = %id, %action, arity = call.arity(), "issuing remote call");
        handler.remote().invoke(call);
        Ok(Dispatch::Issued(id))
    }
}

impl fmt::Debug for RpcProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcProxy")
            .field("registry", &self.registry)
            .field("events", &self.events)
            .field("config", &self.config)
            .finish()
    }
}
