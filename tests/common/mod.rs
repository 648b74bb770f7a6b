//! Shared helpers for proxy integration tests
//!
//! A parking remote function (calls are held until the test completes them)
//! and collectors for outcomes and notifications.

use rpc_proxy::{ProxyEvent, RemoteCall, RemoteFunction, RequestOutcome, RpcProxy};
use std::sync::{Arc, Mutex};

/// Remote function that parks every call for the test to complete.
#[derive(Clone, Default)]
pub struct ParkingRemote {
    calls: Arc<Mutex<Vec<RemoteCall>>>,
}

impl ParkingRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all parked calls, in issue order.
    pub fn take(&self) -> Vec<RemoteCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    pub fn pending(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl RemoteFunction for ParkingRemote {
    fn invoke(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Collects every outcome delivered to callbacks it hands out.
#[derive(Clone, Default)]
pub struct Outcomes {
    inner: Arc<Mutex<Vec<RequestOutcome>>>,
}

impl Outcomes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl FnOnce(RequestOutcome) + Send + 'static {
        let inner = self.inner.clone();
        move |outcome: RequestOutcome| inner.lock().unwrap().push(outcome)
    }

    pub fn all(&self) -> Vec<RequestOutcome> {
        self.inner.lock().unwrap().clone()
    }

    /// The single outcome; panics unless exactly one was delivered.
    pub fn only(&self) -> RequestOutcome {
        let all = self.all();
        assert_eq!(all.len(), 1, "expected exactly one callback, got {}", all.len());
        all.into_iter().next().unwrap()
    }
}

/// Record every notification the proxy publishes.
pub fn record_events(proxy: &RpcProxy) -> Arc<Mutex<Vec<ProxyEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    proxy
        .events()
        .observe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

pub fn event_names(events: &Arc<Mutex<Vec<ProxyEvent>>>) -> Vec<&'static str> {
    events.lock().unwrap().iter().map(ProxyEvent::name).collect()
}
