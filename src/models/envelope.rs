use crate::models::identifiers::TransactionId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a resolved call hands back: the whole response envelope.
pub type ResponsePayload = Value;

/// Name of the response `type` the host uses to report a failed command.
pub const ERROR_TYPE: &str = "Error";

/// As sent over the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(rename = "transactionId")]
    pub transaction_id: TransactionId,
}

impl RequestEnvelope {
    /// Serializes the envelope for the transport.
    pub fn to_wire(&self) -> String {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::String(self.type_name.clone()));
        obj.insert("parameters".into(), Value::Object(self.parameters.clone()));
        obj.insert("transactionId".into(), Value::from(self.transaction_id));
        Value::Object(obj).to_string()
    }
}

/// As written back by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "transactionId")]
    pub transaction_id: TransactionId,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseBody {
    Value(Value),
    Error(String),
}

/// Reads the correlating id out of an inbound envelope.
///
/// Returns `None` when the field is missing or is not a non-negative integer;
/// such a response cannot be matched to any call.
pub fn transaction_id_of(response: &Value) -> Option<TransactionId> {
    response.get("transactionId")?.as_u64()
}

/// True if the host flagged this envelope as a failed command.
pub fn is_error_envelope(response: &Value) -> bool {
    response.get("type").and_then(Value::as_str) == Some(ERROR_TYPE)
}

/// Message carried by an error envelope, falling back to a generic text.
pub fn error_message_of(response: &Value) -> String {
    response
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown remote error")
        .to_string()
}
