use crate::models::host_command::ConsoleLevel;
use crate::rpc::client::RpcClient;
use log::{debug, info};
use serde_json::{Map, Value};

/// Where call sites write their console lines.
pub trait Console {
    fn write(&self, level: ConsoleLevel, message: &str);

    fn log(&self, message: &str) {
        self.write(ConsoleLevel::Log, message)
    }
    fn error(&self, message: &str) {
        self.write(ConsoleLevel::Error, message)
    }
    fn warn(&self, message: &str) {
        self.write(ConsoleLevel::Warn, message)
    }
    fn info(&self, message: &str) {
        self.write(ConsoleLevel::Info, message)
    }
    fn debug(&self, message: &str) {
        self.write(ConsoleLevel::Debug, message)
    }
    fn trace(&self, message: &str) {
        self.write(ConsoleLevel::Trace, message)
    }
}

/// Forwards console lines to the host's `console` command.
///
/// Lines are fire-and-forget: the reply handle is dropped right away.
#[derive(Clone)]
pub struct RemoteConsole {
    client: RpcClient,
}

impl RemoteConsole {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }
}

impl Console for RemoteConsole {
    fn write(&self, level: ConsoleLevel, message: &str) {
        let mut parameters = Map::new();
        parameters.insert("level".into(), Value::from(level.as_str()));
        parameters.insert("message".into(), Value::from(message));

        if let Err(e) = self.client.call("console", Some(parameters)) {
            debug!("console line not forwarded ({e}): {message}");
        }
    }
}

/// Writes console lines straight to the local logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalConsole;

impl Console for LocalConsole {
    fn write(&self, level: ConsoleLevel, message: &str) {
        match level {
            ConsoleLevel::Log | ConsoleLevel::Info => info!("{message}"),
            ConsoleLevel::Error => log::error!("{message}"),
            ConsoleLevel::Warn => log::warn!("{message}"),
            ConsoleLevel::Debug => debug!("{message}"),
            ConsoleLevel::Trace => log::trace!("{message}"),
        }
    }
}
