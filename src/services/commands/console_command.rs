use crate::errors::HostResult;
use crate::models::host_command::ConsoleCommand;
use crate::services::commands::traits::host_command_trait::{HostCommandTrait, Reply};
use crate::state::HostState;
use log::{debug, error, info, trace, warn};

impl HostCommandTrait for ConsoleCommand {
    fn execute(&self, _host_state: &mut HostState) -> HostResult<Reply> {
        process_console_command(self)
    }
}

/// Writes a page console line to the host log at the matching level.
///
/// Unknown levels are still logged, as errors, and the command succeeds.
fn process_console_command(cmd: &ConsoleCommand) -> HostResult<Reply> {
    trace!("process_console_command(cmd: &ConsoleCommand)");
    let message = &cmd.message;

    match cmd.level.as_str() {
        "log" | "info" => info!("{message}"),
        "error" => error!("{message}"),
        "warn" => warn!("{message}"),
        "debug" => debug!("{message}"),
        "trace" => trace!("{message}"),
        other => error!("unknown level {other} for message {message}"),
    }
    Ok(Reply::void())
}
