use crate::models::identifiers::TransactionId;

#[derive(thiserror::Error, Debug)]
pub enum AppErrors {
    #[error("io: {0}")]
    Io(String),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Terminal failure of a single call, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    #[error("call type must not be empty")]
    EmptyType,
    #[error("IPC not available")]
    TransportUnavailable,
    #[error("RPC response timeout for transaction {0}")]
    Timeout(TransactionId),
    #[error("remote error: {0}")]
    Remote(String),
    #[error("transaction {0} cancelled")]
    Cancelled(TransactionId),
    #[error("client shut down")]
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Missing parameter: {0}")]
    NoParam(String),
    #[error("Incompatible parameter: {0}")]
    BadParam(String),
    #[error("overflow")]
    Overflow,
    #[error("unknown ipc request type {0}")]
    UnknownType(String),
    #[error("fail to encode result: {0}")]
    Encode(String),
}

pub type AppResult<T> = Result<T, AppErrors>;
pub type RpcResult<T> = Result<T, RpcError>;
pub type HostResult<T> = Result<T, HostError>;
