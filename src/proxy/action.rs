//! CRUD actions a proxy can be asked to perform

use super::error::ProxyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of actions a data proxy dispatches.
///
/// `Read` loads records; the other three are write actions that carry
/// record payloads to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Destroy,
}

impl Action {
    /// Every action, in registry order.
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Destroy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Destroy => "destroy",
        }
    }

    /// True for create, update and destroy.
    pub fn is_write(&self) -> bool {
        !matches!(self, Action::Read)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ProxyError::UnknownAction(s.to_string()))
    }
}
