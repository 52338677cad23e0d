use std::time::Duration;

/// How long a call may stay pending before it is rejected with a timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// The first transaction id handed out by a fresh client.
pub const FIRST_TRANSACTION_ID: u64 = 0;

/// Age reported by the `Greet` command.
pub const GREET_AGE: u8 = 29;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// How often the binary sweeps calls nobody is awaiting.
pub const REAP_INTERVAL: Duration = Duration::from_secs(1);
