//! Response dispatcher: one remote completion → one caller outcome
//!
//! Every issued request ends in exactly one of four terminal states:
//! decoded ok, decode failure, logical rejection, transport failure. Each
//! publishes its notification and then invokes the caller's callback once.
//! Nothing here is retried.

use super::action::Action;
use super::completion::RemoteFailure;
use super::events::{EventChannel, ExceptionDetail, ProxyEvent};
use super::transaction::{Record, Transaction};
use crate::reader::{ReadResult, ReaderError};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// What the caller's callback receives.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    pub transaction_id: Uuid,
    pub action: Action,
    /// The decoded block. `None` on decode failure, transport failure or veto;
    /// present (with the server's partial data) on rejection.
    pub data: Option<ReadResult>,
    /// The caller's opaque options, unchanged.
    pub options: Value,
    pub success: bool,
}

impl RequestOutcome {
    pub(crate) fn failed(transaction: &Transaction) -> Self {
        Self {
            transaction_id: transaction.id(),
            action: transaction.action(),
            data: None,
            options: transaction.options().clone(),
            success: false,
        }
    }

    /// Decoded records, or an empty slice when there is no data.
    pub fn records(&self) -> &[Record] {
        self.data.as_ref().map(|d| d.records.as_slice()).unwrap_or(&[])
    }

    /// Plain payloads of the decoded records.
    pub fn payloads(&self) -> Vec<Value> {
        super::transaction::record_payloads(self.records())
    }
}

/// Caller continuation for one request.
pub type RequestCallback = Box<dyn FnOnce(RequestOutcome) + Send>;

/// Completion logic for one transaction.
pub struct ResponseDispatcher {
    transaction: Arc<Transaction>,
    events: Arc<EventChannel>,
    callback: RequestCallback,
    legacy_load_exception: bool,
}

impl ResponseDispatcher {
    pub fn new(
        transaction: Arc<Transaction>,
        events: Arc<EventChannel>,
        callback: RequestCallback,
        legacy_load_exception: bool,
    ) -> Self {
        Self {
            transaction,
            events,
            callback,
            legacy_load_exception,
        }
    }

    /// Entry point fed by the completion handler.
    pub fn complete(self, result: Result<Value, RemoteFailure>) {
        match result {
            Ok(response) if self.transaction.action().is_write() => self.on_write(response),
            Ok(response) => self.on_read(response),
            Err(failure) => self.on_transport_failure(failure),
        }
    }

    fn on_read(self, response: Value) {
        let block = match self.transaction.reader().read_records(&response) {
            Ok(block) => block,
            Err(error) => return self.on_decode_failure(response, error),
        };

        let trans = &self.transaction;
        if block.is_rejected() {
            self.rejected(response, Vec::new(), block);
        } else {
            self.events.publish(&ProxyEvent::Load {
                transaction_id: trans.id(),
                block: block.clone(),
                options: trans.options().clone(),
            });
            self.finish(Some(block), true);
        }
    }

    fn on_write(self, response: Value) {
        let trans = &self.transaction;
        let block = match trans.reader().read_response(trans.action(), &response) {
            Ok(block) => block,
            Err(error) => return self.on_decode_failure(response, error),
        };

        if block.is_rejected() {
            let records = trans.records().to_vec();
            self.rejected(response, records, block);
        } else {
            self.events.publish(&ProxyEvent::Write {
                transaction_id: trans.id(),
                action: trans.action(),
                records: block.records.clone(),
                block: block.clone(),
                original_records: trans.records().to_vec(),
                options: trans.options().clone(),
            });
            self.finish(Some(block), true);
        }
    }

    fn rejected(self, response: Value, records: Vec<Record>, block: ReadResult) {
        tracing::warn!(
            transaction = %self.transaction.id(),
            action = %self.transaction.action(),
            "server rejected request"
        );
        self.exception(ExceptionDetail::Rejection { response, records });
        self.finish(Some(block), false);
    }

    fn on_decode_failure(self, response: Value, error: ReaderError) {
        tracing::warn!(
            transaction = %self.transaction.id(),
            action = %self.transaction.action(),
            %error,
            "could not decode remote response"
        );
        self.exception(ExceptionDetail::Decode { response, error });
        self.finish(None, false);
    }

    fn on_transport_failure(self, failure: RemoteFailure) {
        let trans = &self.transaction;
        tracing::warn!(
            transaction = %trans.id(),
            action = %trans.action(),
            message = %failure.message,
            "remote call failed"
        );
        if self.legacy_load_exception && trans.action() == Action::Read {
            self.events.publish(&ProxyEvent::LoadException {
                transaction_id: trans.id(),
                options: trans.options().clone(),
                failure: failure.clone(),
            });
        }
        self.exception(ExceptionDetail::Transport(failure));
        self.finish(None, false);
    }

    fn exception(&self, detail: ExceptionDetail) {
        self.events.publish(&ProxyEvent::Exception {
            transaction_id: self.transaction.id(),
            action: self.transaction.action(),
            options: self.transaction.options().clone(),
            detail,
        });
    }

    fn finish(self, data: Option<ReadResult>, success: bool) {
        let trans = self.transaction;
        let elapsed_ms = (Utc::now() - trans.issued_at()).num_milliseconds();
        tracing::debug!(
            transaction = %trans.id(),
            action = %trans.action(),
            success,
            elapsed_ms,
            "request complete"
        );
        (self.callback)(RequestOutcome {
            transaction_id: trans.id(),
            action: trans.action(),
            data,
            options: trans.options().clone(),
            success,
        });
    }
}
