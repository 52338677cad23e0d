use crate::errors::{HostError, HostResult};
use crate::models::host_command::{
    DecrementCounterCommand, IncrementCounterCommand, UpdateCounterCommand,
};
use crate::services::commands::traits::host_command_trait::{HostCommandTrait, Reply};
use crate::state::HostState;
use log::{debug, trace};

impl HostCommandTrait for IncrementCounterCommand {
    fn execute(&self, _host_state: &mut HostState) -> HostResult<Reply> {
        trace!("IncrementCounterCommand::execute");
        let next = self.value.checked_add(1).ok_or(HostError::Overflow)?;
        Reply::of("i32", &next)
    }
}

impl HostCommandTrait for DecrementCounterCommand {
    fn execute(&self, _host_state: &mut HostState) -> HostResult<Reply> {
        trace!("DecrementCounterCommand::execute");
        let next = self.value.checked_sub(1).ok_or(HostError::Overflow)?;
        Reply::of("i32", &next)
    }
}

impl HostCommandTrait for UpdateCounterCommand {
    /// Records the page's current counter value on the host.
    fn execute(&self, host_state: &mut HostState) -> HostResult<Reply> {
        trace!("UpdateCounterCommand::execute");
        debug!("counter {} -> {}", host_state.counter, self.value);
        host_state.counter = self.value;
        Ok(Reply::void())
    }
}
