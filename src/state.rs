use crate::consts::FIRST_TRANSACTION_ID;
use crate::errors::RpcResult;
use crate::models::envelope::ResponsePayload;
use crate::models::identifiers::TransactionId;
use std::collections::HashMap;
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant};

/// An in-flight call waiting for exactly one terminal event.
#[derive(Debug)]
pub struct PendingCall {
    settle: oneshot::Sender<RpcResult<ResponsePayload>>,
    /// Remote operation name, for logging.
    pub type_name: String,
    pub created_at: Instant,
    pub deadline: Instant,
}

impl PendingCall {
    /// Hands the outcome to the waiting caller.
    ///
    /// Consumes the call so it cannot be settled twice. Returns `false` if the
    /// caller already dropped its reply handle.
    pub fn settle(self, outcome: RpcResult<ResponsePayload>) -> bool {
        self.settle.send(outcome).is_ok()
    }

    pub fn elapsed(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// The client's correlation table: the id counter plus every live call.
///
/// Ids are never reused. A call leaves the table on its first terminal event,
/// so any later event for the same id finds nothing.
#[derive(Debug)]
pub struct PendingCalls {
    next_id: TransactionId,
    calls: HashMap<TransactionId, PendingCall>,
}

impl Default for PendingCalls {
    fn default() -> Self {
        Self {
            next_id: FIRST_TRANSACTION_ID,
            calls: HashMap::new(),
        }
    }
}

impl PendingCalls {
    /// Allocates the next id and registers a call under it.
    pub fn register(
        &mut self,
        type_name: &str,
        deadline: Instant,
    ) -> (TransactionId, oneshot::Receiver<RpcResult<ResponsePayload>>) {
        let id = self.next_id;
        self.next_id += 1;

        let (tx, rx) = oneshot::channel();
        self.calls.insert(
            id,
            PendingCall {
                settle: tx,
                type_name: type_name.to_string(),
                created_at: Instant::now(),
                deadline,
            },
        );
        (id, rx)
    }

    /// Removes and returns the call, or `None` if it already terminated.
    pub fn take(&mut self, id: TransactionId) -> Option<PendingCall> {
        self.calls.remove(&id)
    }

    /// Removes every live call, in id order.
    pub fn drain(&mut self) -> Vec<(TransactionId, PendingCall)> {
        let mut all: Vec<_> = self.calls.drain().collect();
        all.sort_by_key(|(id, _)| *id);
        all
    }

    /// Removes every call whose deadline has passed, in id order.
    pub fn remove_expired(&mut self, now: Instant) -> Vec<(TransactionId, PendingCall)> {
        let mut ids: Vec<_> = self
            .calls
            .iter()
            .filter(|(_, call)| call.is_expired(now))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| self.calls.remove(&id).map(|call| (id, call)))
            .collect()
    }

    pub fn contains(&self, id: TransactionId) -> bool {
        self.calls.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }
}

/// State owned by the in-process host.
#[derive(Debug, Default, Clone)]
pub struct HostState {
    /// Last value reported through `UpdateCounter`.
    pub counter: i32,
}
