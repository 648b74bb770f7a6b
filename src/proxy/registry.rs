//! Action-handler registry
//!
//! Maps each action to the remote function that serves it and, optionally,
//! the builder that computes its arguments. Built once, immutable afterwards.

use super::action::Action;
use super::error::ProxyError;
use super::traits::{ArgsBuilder, RemoteFunction};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Per-action configuration.
#[derive(Clone)]
pub struct ActionHandler {
    remote: Arc<dyn RemoteFunction>,
    args_builder: Option<Arc<dyn ArgsBuilder>>,
}

impl ActionHandler {
    pub fn new(remote: impl RemoteFunction + 'static) -> Self {
        Self::from_arc(Arc::new(remote))
    }

    pub fn from_arc(remote: Arc<dyn RemoteFunction>) -> Self {
        Self {
            remote,
            args_builder: None,
        }
    }

    pub fn with_args_builder(mut self, builder: impl ArgsBuilder + 'static) -> Self {
        self.args_builder = Some(Arc::new(builder));
        self
    }

    pub fn remote(&self) -> &dyn RemoteFunction {
        self.remote.as_ref()
    }

    pub fn args_builder(&self) -> Option<&dyn ArgsBuilder> {
        self.args_builder.as_deref()
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandler")
            .field("args_builder", &self.args_builder.is_some())
            .finish_non_exhaustive()
    }
}

/// Immutable action → handler mapping.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<Action, ActionHandler>,
}

impl HandlerRegistry {
    /// Start a registry in code.
    ///
    /// [`HandlerRegistryBuilder::handler`] lets a later registration replace
    /// an earlier one for the same action; [`HandlerRegistryBuilder::try_handler`]
    /// rejects it with [`ProxyError::DuplicateHandler`] the way
    /// [`HandlerRegistry::from_named`] does.
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    /// Build from string-keyed entries, as handler maps are usually written.
    ///
    /// Unknown action names and repeated names are rejected here rather than
    /// at request time.
    pub fn from_named<'a, I>(entries: I) -> Result<Self, ProxyError>
    where
        I: IntoIterator<Item = (&'a str, ActionHandler)>,
    {
        let mut builder = Self::builder();
        for (name, handler) in entries {
            builder = builder.try_handler(name.parse()?, handler)?;
        }
        Ok(builder.build())
    }

    /// Look up the handler for `action`. A miss is a configuration error.
    pub fn get(&self, action: Action) -> Result<&ActionHandler, ProxyError> {
        self.handlers.get(&action).ok_or(ProxyError::NoHandler(action))
    }

    pub fn contains(&self, action: Action) -> bool {
        self.handlers.contains_key(&action)
    }

    /// Registered actions in canonical order.
    pub fn actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| self.handlers.contains_key(a))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct HandlerRegistryBuilder {
    handlers: HashMap<Action, ActionHandler>,
}

impl HandlerRegistryBuilder {
    /// Register `handler` for `action`, replacing any earlier registration.
    pub fn handler(mut self, action: Action, handler: ActionHandler) -> Self {
        self.handlers.insert(action, handler);
        self
    }

    /// Register `handler` for `action`, failing if `action` already has one.
    pub fn try_handler(mut self, action: Action, handler: ActionHandler) -> Result<Self, ProxyError> {
        if self.handlers.contains_key(&action) {
            return Err(ProxyError::DuplicateHandler(action));
        }
        self.handlers.insert(action, handler);
        Ok(self)
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}
