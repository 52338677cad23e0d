use crate::consts::TIME_FORMAT;
use crate::errors::HostResult;
use crate::models::host_command::GetTimeCommand;
use crate::services::commands::traits::host_command_trait::{HostCommandTrait, Reply};
use crate::state::HostState;
use log::{debug, trace};

impl HostCommandTrait for GetTimeCommand {
    fn execute(&self, _host_state: &mut HostState) -> HostResult<Reply> {
        trace!("GetTimeCommand::execute");
        let time = chrono::Utc::now().format(TIME_FORMAT).to_string();
        debug!("time: {time}");
        Reply::of("String", &time)
    }
}
