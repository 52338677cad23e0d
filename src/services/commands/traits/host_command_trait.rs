use crate::errors::{HostError, HostResult};
use crate::state::HostState;
use serde::Serialize;
use serde_json::Value;

/// Result of a host command, ready to go into a response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Name of the result type, echoed as the response's `type`.
    pub type_name: &'static str,
    pub value: Value,
}

impl Reply {
    pub fn of<T: Serialize>(type_name: &'static str, value: &T) -> HostResult<Reply> {
        let value = serde_json::to_value(value).map_err(|e| HostError::Encode(e.to_string()))?;
        Ok(Reply { type_name, value })
    }

    /// A command with nothing to return.
    pub fn void() -> Reply {
        Reply {
            type_name: "Void",
            value: Value::Null,
        }
    }
}

/// A trait that defines the behavior of commands the host can run on behalf
/// of the page.
pub trait HostCommandTrait {
    /// Executes the command against the host state.
    ///
    /// # Arguments
    /// * `host_state` - A mutable reference to the host state.
    ///
    /// # Returns
    /// * `HostResult<Reply>` - The typed result, or a `HostError` that is
    ///   reported back to the caller as an error envelope.
    fn execute(&self, host_state: &mut HostState) -> HostResult<Reply>;
}
