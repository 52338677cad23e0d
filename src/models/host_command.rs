use serde::Serialize;

/// Severity of a console line forwarded to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl ConsoleLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ConsoleLevel::Log => "log",
            ConsoleLevel::Error => "error",
            ConsoleLevel::Warn => "warn",
            ConsoleLevel::Info => "info",
            ConsoleLevel::Debug => "debug",
            ConsoleLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleCommand {
    /// Kept as text so unknown levels can still be reported.
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct GreetCommand {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct IncrementCounterCommand {
    pub value: i32,
}

#[derive(Debug, Clone)]
pub struct DecrementCounterCommand {
    pub value: i32,
}

#[derive(Debug, Clone)]
pub struct UpdateCounterCommand {
    pub value: i32,
}

#[derive(Debug, Clone)]
pub struct GetTimeCommand;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub name: String,
    pub age: u8,
}
