use crate::errors::RpcError;
use crate::models::envelope::ResponsePayload;
use crate::models::identifiers::TransactionId;
use serde::{Deserialize, Serialize};

/// As read from input CSV
#[derive(Debug, Deserialize)]
pub struct InputRow {
    #[serde(rename = "type")]
    pub t: String,
    /// JSON object text; absent means `{}`.
    pub parameters: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Ok,
    Error,
}

/// As written to output CSV
#[derive(Debug, Serialize)]
pub struct OutputRow {
    /// Empty when the call never reached the transport.
    pub transaction_id: Option<TransactionId>,
    #[serde(rename = "type")]
    pub t: String,
    pub status: CallStatus,
    pub payload: String,
}

type CallOutcome = (Option<TransactionId>, String, Result<ResponsePayload, RpcError>);

impl From<CallOutcome> for OutputRow {
    fn from((transaction_id, t, outcome): CallOutcome) -> Self {
        let (status, payload) = match outcome {
            Ok(value) => (CallStatus::Ok, value.to_string()),
            Err(e) => (CallStatus::Error, e.to_string()),
        };
        Self {
            transaction_id,
            t,
            status,
            payload,
        }
    }
}
