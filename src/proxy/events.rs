//! Notifications published by the proxy
//!
//! One enumerated channel carries every lifecycle notification. Listeners
//! observe all of them; only the two `Before*` notifications consult the
//! listener's verdict.

use super::action::Action;
use super::completion::RemoteFailure;
use super::transaction::Record;
use crate::reader::{ReadResult, ReaderError};
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Exception classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    /// The reader could not decode the response
    ResponseDecode,
    /// The server answered with `success: false`
    RemoteRejection,
    /// The remote call itself failed
    RemoteTransport,
}

impl ExceptionKind {
    /// Coarse category listeners switch on: `"response"` or `"remote"`.
    pub fn category(&self) -> &'static str {
        match self {
            ExceptionKind::ResponseDecode => "response",
            ExceptionKind::RemoteRejection | ExceptionKind::RemoteTransport => "remote",
        }
    }
}

/// What went wrong, with the data available at the failure point.
#[derive(Debug, Clone, PartialEq)]
pub enum ExceptionDetail {
    Decode {
        response: Value,
        error: ReaderError,
    },
    Rejection {
        response: Value,
        /// Records the caller asked to write (empty for reads)
        records: Vec<Record>,
    },
    Transport(RemoteFailure),
}

/// A proxy lifecycle notification.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyEvent {
    /// A read is about to be issued. Vetoable.
    BeforeLoad {
        transaction_id: Uuid,
        params: Map<String, Value>,
        options: Value,
    },
    /// A write is about to be issued. Vetoable.
    BeforeWrite {
        transaction_id: Uuid,
        action: Action,
        records: Vec<Record>,
        params: Map<String, Value>,
        options: Value,
    },
    /// A read completed and decoded successfully.
    Load {
        transaction_id: Uuid,
        block: ReadResult,
        options: Value,
    },
    /// A write completed and decoded successfully.
    Write {
        transaction_id: Uuid,
        action: Action,
        /// Records decoded from the response root
        records: Vec<Record>,
        block: ReadResult,
        /// Records the caller asked to write
        original_records: Vec<Record>,
        options: Value,
    },
    Exception {
        transaction_id: Uuid,
        action: Action,
        options: Value,
        detail: ExceptionDetail,
    },
    /// Deprecated duplicate of a read's transport `Exception`, kept for
    /// listeners written against the older notification set.
    LoadException {
        transaction_id: Uuid,
        options: Value,
        failure: RemoteFailure,
    },
}

impl ProxyEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ProxyEvent::BeforeLoad { .. } => "beforeload",
            ProxyEvent::BeforeWrite { .. } => "beforewrite",
            ProxyEvent::Load { .. } => "load",
            ProxyEvent::Write { .. } => "write",
            ProxyEvent::Exception { .. } => "exception",
            ProxyEvent::LoadException { .. } => "loadexception",
        }
    }

    pub fn transaction_id(&self) -> Uuid {
        match self {
            ProxyEvent::BeforeLoad { transaction_id, .. }
            | ProxyEvent::BeforeWrite { transaction_id, .. }
            | ProxyEvent::Load { transaction_id, .. }
            | ProxyEvent::Write { transaction_id, .. }
            | ProxyEvent::Exception { transaction_id, .. }
            | ProxyEvent::LoadException { transaction_id, .. } => *transaction_id,
        }
    }

    /// The exception kind, for `Exception` notifications.
    pub fn exception_kind(&self) -> Option<ExceptionKind> {
        match self {
            ProxyEvent::Exception { detail, .. } => Some(match detail {
                ExceptionDetail::Decode { .. } => ExceptionKind::ResponseDecode,
                ExceptionDetail::Rejection { .. } => ExceptionKind::RemoteRejection,
                ExceptionDetail::Transport(_) => ExceptionKind::RemoteTransport,
            }),
            _ => None,
        }
    }

    pub fn is_vetoable(&self) -> bool {
        matches!(self, ProxyEvent::BeforeLoad { .. } | ProxyEvent::BeforeWrite { .. })
    }
}

/// A listener's answer to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Proceed,
    /// Cancel the request. Only honoured for `Before*` notifications.
    Veto,
}

/// Subscriber to proxy notifications.
pub trait ProxyListener: Send + Sync {
    fn on_event(&self, event: &ProxyEvent) -> Verdict;
}

impl<F> ProxyListener for F
where
    F: Fn(&ProxyEvent) -> Verdict + Send + Sync,
{
    fn on_event(&self, event: &ProxyEvent) -> Verdict {
        self(event)
    }
}

/// Fan-out channel for proxy notifications.
#[derive(Default)]
pub struct EventChannel {
    listeners: RwLock<Vec<Arc<dyn ProxyListener>>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn ProxyListener>) {
        self.write_listeners().push(listener);
    }

    /// Subscribe a listener that only observes and never vetoes.
    pub fn observe(&self, f: impl Fn(&ProxyEvent) + Send + Sync + 'static) {
        self.subscribe(Arc::new(move |event: &ProxyEvent| {
            f(event);
            Verdict::Proceed
        }));
    }

    pub fn listener_count(&self) -> usize {
        self.read_listeners().len()
    }

    /// Deliver `event` to every listener, ignoring verdicts.
    pub fn publish(&self, event: &ProxyEvent) {
        tracing::trace!(event = event.name(), transaction = %event.transaction_id(), "publish");
        for listener in self.snapshot() {
            listener.on_event(event);
        }
    }

    /// Deliver `event` to every listener; `Veto` if any listener vetoed.
    ///
    /// All listeners see the event even after one has vetoed.
    pub fn publish_vetoable(&self, event: &ProxyEvent) -> Verdict {
        tracing::trace!(event = event.name(), transaction = %event.transaction_id(), "publish");
        self.snapshot()
            .iter()
            .map(|l| l.on_event(event))
            .fold(Verdict::Proceed, |acc, v| {
                if v == Verdict::Veto { Verdict::Veto } else { acc }
            })
    }

    // Listeners run on a snapshot so they may subscribe from inside a callback.
    fn snapshot(&self) -> Vec<Arc<dyn ProxyListener>> {
        self.read_listeners().clone()
    }

    fn read_listeners(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<dyn ProxyListener>>> {
        self.listeners.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_listeners(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<dyn ProxyListener>>> {
        self.listeners.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
