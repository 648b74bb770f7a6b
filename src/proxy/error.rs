//! Errors raised synchronously by the proxy

use super::action::Action;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned synchronously by the proxy.
///
/// Apart from `Abandoned`, these are configuration errors, and they are the
/// only errors that escape the request entry point. Decode
/// failures, rejections and transport failures are absorbed and reported
/// through the caller's callback and the event channel instead.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no action handler defined for action: {0}")]
    NoHandler(Action),
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("duplicate action handler for action: {0}")]
    DuplicateHandler(Action),
    /// Only returned by the awaiting `execute` helper.
    #[error("remote function dropped the completion handler of transaction {0}")]
    Abandoned(Uuid),
}
