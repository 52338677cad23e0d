use crate::errors::{HostError, HostResult};
use crate::models::envelope::{ERROR_TYPE, RequestEnvelope, ResponseBody, ResponseEnvelope};
use crate::models::host_command::{
    ConsoleCommand, DecrementCounterCommand, GetTimeCommand, GreetCommand,
    IncrementCounterCommand, UpdateCounterCommand,
};
use crate::services::commands::traits::host_command_trait::HostCommandTrait;
use crate::services::params::Params;
use crate::state::HostState;
use log::{debug, error, trace};
use std::cell::RefCell;

/// The host end of the bridge: turns request envelopes into response
/// envelopes.
#[derive(Debug, Default)]
pub struct HostService {
    state: RefCell<HostState>,
}

impl HostService {
    pub fn new(state: HostState) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> HostState {
        self.state.borrow().clone()
    }

    /// Handles one serialized request.
    ///
    /// # Arguments
    /// * `ipc_message` - The request envelope as sent by the client.
    ///
    /// # Returns
    /// * `Option<String>` - The serialized response envelope. `None` when the
    ///   request cannot be parsed or names an unknown type; nothing is sent
    ///   back and the caller's deadline takes over.
    pub fn handle(&self, ipc_message: &str) -> Option<String> {
        trace!("handle(ipc_message: &str) -> Option<String>");
        debug!("ipc message: {ipc_message}");

        let request: RequestEnvelope = match serde_json::from_str(ipc_message) {
            Ok(request) => request,
            Err(e) => {
                error!("fail to parse ipc request: {e}");
                return None;
            }
        };

        let outcome = request_to_command(&request)
            .and_then(|cmd| cmd.execute(&mut self.state.borrow_mut()));

        let (type_name, body) = match outcome {
            Ok(reply) => (reply.type_name, ResponseBody::Value(reply.value)),
            Err(HostError::UnknownType(t)) => {
                error!("unknown ipc request type {t}");
                return None;
            }
            Err(e) => {
                error!("{} failed: {e}", request.type_name);
                (ERROR_TYPE, ResponseBody::Error(e.to_string()))
            }
        };

        let response = ResponseEnvelope {
            transaction_id: request.transaction_id,
            type_name,
            body,
        };
        match serde_json::to_string(&response) {
            Ok(json) => {
                debug!("response: {json}");
                Some(json)
            }
            Err(e) => {
                error!("fail to serialize response: {e}");
                None
            }
        }
    }
}

/// Converts a request envelope into a host command.
///
/// # Returns
/// * `HostResult<Box<dyn HostCommandTrait>>` - The command, `UnknownType` for an
///   unrecognised `type`, or a parameter error.
fn request_to_command(request: &RequestEnvelope) -> HostResult<Box<dyn HostCommandTrait>> {
    let params = Params::new(request.parameters.clone());
    match request.type_name.as_str() {
        "console" => Ok(Box::new(ConsoleCommand {
            level: params.str("level")?,
            message: params.str("message")?,
        })),
        "Greet" => Ok(Box::new(GreetCommand {
            name: params.str("name")?,
        })),
        "IncrementCounter" => Ok(Box::new(IncrementCounterCommand {
            value: params.i32("value")?,
        })),
        "DecrementCounter" => Ok(Box::new(DecrementCounterCommand {
            value: params.i32("value")?,
        })),
        "UpdateCounter" => Ok(Box::new(UpdateCounterCommand {
            value: params.i32("value")?,
        })),
        "GetTime" => Ok(Box::new(GetTimeCommand)),
        other => Err(HostError::UnknownType(other.to_string())),
    }
}
