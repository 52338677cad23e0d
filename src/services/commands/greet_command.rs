use crate::consts::GREET_AGE;
use crate::errors::HostResult;
use crate::models::host_command::{GreetCommand, User};
use crate::services::commands::traits::host_command_trait::{HostCommandTrait, Reply};
use crate::state::HostState;
use log::{info, trace};

impl HostCommandTrait for GreetCommand {
    fn execute(&self, _host_state: &mut HostState) -> HostResult<Reply> {
        process_greet_command(self)
    }
}

fn process_greet_command(cmd: &GreetCommand) -> HostResult<Reply> {
    trace!("process_greet_command(cmd: &GreetCommand)");
    info!("greeting from {}", cmd.name);

    let user = User {
        name: cmd.name.clone(),
        age: GREET_AGE,
    };
    Reply::of("User", &user)
}
