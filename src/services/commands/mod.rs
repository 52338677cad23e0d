pub mod console_command;
pub mod counter_command;
pub mod greet_command;
pub mod time_command;
pub mod traits;
