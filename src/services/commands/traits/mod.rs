pub mod host_command_trait;
