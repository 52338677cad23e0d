use crate::errors::{AppErrors, AppResult};
use crate::models::csv_models::call::{InputRow, OutputRow};
use crate::rpc::client::RpcClient;
use crate::rpc::console::Console;
use csv::ReaderBuilder;
use log::error;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};

/// A call read from the input, ready to be issued.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSpec {
    pub type_name: String,
    pub parameters: Map<String, Value>,
}

/// Runs every call listed in a CSV file and collects one output row per call.
///
/// # Arguments
/// * `path` - The file path to the CSV file with `type,parameters` rows.
/// * `client` - The RPC client the calls are issued through.
/// * `console` - Where request/response progress lines are written.
///
/// # Returns
/// * `AppResult<Vec<OutputRow>>` - The rows in input order, or an `AppErrors`
///   variant if the file cannot be opened.
pub async fn run_from_csv_path(
    path: &str,
    client: &RpcClient,
    console: &dyn Console,
) -> AppResult<Vec<OutputRow>> {
    let file = File::open(path).map_err(|e| AppErrors::Io(format!("open {path}: {e}")))?;
    let calls = read_calls(BufReader::new(file));
    Ok(run_calls(calls, client, console).await)
}

/// Parses call rows, logging and skipping the ones that are malformed.
pub fn read_calls<R: Read>(reader: R) -> Vec<CallSpec> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut calls = Vec::new();
    for rec in rdr.deserialize::<InputRow>() {
        match rec {
            Ok(row) => match row_to_call(row) {
                Ok(call) => calls.push(call),
                Err(e) => error!("skip row: {e}"),
            },
            Err(e) => error!("skip malformed CSV row: {e}"),
        }
    }
    calls
}

/// Issues every call first, then awaits the replies in the same order.
///
/// Issuing up front means ids follow row order and all calls are in flight
/// together, each against its own deadline.
pub async fn run_calls(
    calls: Vec<CallSpec>,
    client: &RpcClient,
    console: &dyn Console,
) -> Vec<OutputRow> {
    let mut issued = Vec::with_capacity(calls.len());
    for call in calls {
        console.info(&format!(
            "request: {} {}",
            call.type_name,
            Value::Object(call.parameters.clone())
        ));
        let reply = client.call(&call.type_name, Some(call.parameters));
        issued.push((call.type_name, reply));
    }

    let mut rows = Vec::with_capacity(issued.len());
    for (type_name, reply) in issued {
        let row = match reply {
            Ok(reply) => {
                let transaction_id = reply.transaction_id();
                let outcome = reply.response().await;
                match &outcome {
                    Ok(response) => console.info(&format!("response: {response}")),
                    Err(e) => console.warn(&format!("{type_name} failed: {e}")),
                }
                OutputRow::from((Some(transaction_id), type_name, outcome))
            }
            Err(e) => {
                console.warn(&format!("{type_name} not sent: {e}"));
                OutputRow::from((None, type_name, Err(e)))
            }
        };
        rows.push(row);
    }
    rows
}

/// Converts a CSV row into a call.
///
/// # Returns
/// * `AppResult<CallSpec>` - The call, or `InvalidInput` if `type` is empty
///   or `parameters` is not a JSON object.
fn row_to_call(row: InputRow) -> AppResult<CallSpec> {
    if row.t.is_empty() {
        return Err(AppErrors::InvalidInput("empty call type"));
    }
    let parameters = match row.parameters.as_deref() {
        None | Some("") => Map::new(),
        Some(text) => match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => map,
            _ => return Err(AppErrors::InvalidInput("parameters must be a JSON object")),
        },
    };
    Ok(CallSpec {
        type_name: row.t,
        parameters,
    })
}
