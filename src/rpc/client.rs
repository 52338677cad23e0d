use crate::consts::DEFAULT_CALL_TIMEOUT;
use crate::errors::{RpcError, RpcResult};
use crate::models::envelope::{
    RequestEnvelope, ResponsePayload, error_message_of, is_error_envelope, transaction_id_of,
};
use crate::models::identifiers::TransactionId;
use crate::rpc::transport::Transport;
use crate::state::{PendingCall, PendingCalls};
use log::{debug, error, info, warn};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy)]
pub struct ClientConfig {
    /// Deadline applied to every call, measured from the moment it is issued.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

struct Inner {
    pending: RefCell<PendingCalls>,
    transport: RefCell<Option<Rc<dyn Transport>>>,
    config: ClientConfig,
}

impl std::fmt::Debug for Inner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inner")
            .field("pending", &self.pending)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Call/response correlation over a one-way transport.
///
/// Every call gets a fresh transaction id, is registered in the pending table,
/// and only then is handed to the transport. The matching response (or error,
/// timeout, cancellation, shutdown) settles it exactly once; whichever comes
/// first removes the entry and the rest find nothing.
///
/// The client is single-threaded: state lives behind `Rc<RefCell<_>>` and no
/// borrow is held across `Transport::send` or an await point. Clones share the
/// same table and counter; separate `RpcClient::new` instances never collide.
#[derive(Clone)]
pub struct RpcClient {
    inner: Rc<Inner>,
}

impl Default for RpcClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl RpcClient {
    /// Creates a client with no transport. Calls fail with
    /// `TransportUnavailable` until one is injected.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                pending: RefCell::new(PendingCalls::default()),
                transport: RefCell::new(None),
                config,
            }),
        }
    }

    pub fn with_transport(config: ClientConfig, transport: Rc<dyn Transport>) -> Self {
        let client = Self::new(config);
        client.set_transport(transport);
        client
    }

    pub fn set_transport(&self, transport: Rc<dyn Transport>) {
        *self.inner.transport.borrow_mut() = Some(transport);
    }

    pub fn config(&self) -> ClientConfig {
        self.inner.config
    }

    /// Issues a call and returns a handle to its eventual reply.
    ///
    /// # Arguments
    /// * `type_name` - Name of the remote operation.
    /// * `parameters` - Call parameters; `None` sends an empty object.
    ///
    /// # Returns
    /// * `RpcResult<PendingReply>` - The reply handle; `EmptyType` for a blank
    ///   `type_name`; `TransportUnavailable` if no transport is configured.
    ///   On error no id is consumed and nothing reaches the transport.
    pub fn call(
        &self,
        type_name: &str,
        parameters: Option<Map<String, Value>>,
    ) -> RpcResult<PendingReply> {
        if type_name.is_empty() {
            return Err(RpcError::EmptyType);
        }
        let Some(transport) = self.inner.transport.borrow().clone() else {
            warn!("call {type_name} rejected: no transport configured");
            return Err(RpcError::TransportUnavailable);
        };

        let deadline = Instant::now() + self.inner.config.timeout;
        let (transaction_id, receiver) = self
            .inner
            .pending
            .borrow_mut()
            .register(type_name, deadline);

        let envelope = RequestEnvelope {
            type_name: type_name.to_string(),
            parameters: parameters.unwrap_or_default(),
            transaction_id,
        };
        let wire = envelope.to_wire();
        debug!("send transaction {transaction_id}: {wire}");
        transport.send(wire);

        Ok(PendingReply {
            transaction_id,
            receiver,
            deadline,
            client: Rc::downgrade(&self.inner),
        })
    }

    /// Issues a call and waits for its outcome.
    pub async fn request(
        &self,
        type_name: &str,
        parameters: Option<Map<String, Value>>,
    ) -> RpcResult<ResponsePayload> {
        self.call(type_name, parameters)?.response().await
    }

    /// Settles the call named by the response's `transactionId` with the
    /// whole envelope.
    ///
    /// Responses without a usable id are logged and dropped. Unknown or
    /// already-settled ids are ignored. Returns `true` if a pending call
    /// was matched.
    pub fn handle_response(&self, response: Value) -> bool {
        let Some(transaction_id) = transaction_id_of(&response) else {
            error!("dropping malformed response without transactionId: {response}");
            return false;
        };
        let Some(call) = self.take(transaction_id) else {
            return false;
        };
        debug!(
            "transaction {transaction_id} ({}) resolved after {} ms",
            call.type_name,
            call.elapsed().as_millis()
        );
        call.settle(Ok(response));
        true
    }

    /// Rejects the given call with a remote error. Same lookup rules as
    /// [`RpcClient::handle_response`].
    pub fn handle_error(&self, transaction_id: TransactionId, error: impl Into<String>) -> bool {
        let Some(call) = self.take(transaction_id) else {
            return false;
        };
        let error = error.into();
        debug!(
            "transaction {transaction_id} ({}) rejected: {error}",
            call.type_name
        );
        call.settle(Err(RpcError::Remote(error)));
        true
    }

    /// Parses raw inbound text and routes it to the response or error path.
    pub fn handle_inbound(&self, raw: &str) -> bool {
        let response: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                error!("dropping unparseable response: {e}");
                return false;
            }
        };
        if !is_error_envelope(&response) {
            return self.handle_response(response);
        }
        match transaction_id_of(&response) {
            Some(id) => self.handle_error(id, error_message_of(&response)),
            None => {
                error!("dropping malformed error response without transactionId: {response}");
                false
            }
        }
    }

    /// Feeds every inbound message to the client until the channel closes.
    pub async fn pump(&self, mut inbound: UnboundedReceiver<String>) {
        while let Some(raw) = inbound.recv().await {
            self.handle_inbound(&raw);
        }
        debug!("inbound channel closed");
    }

    /// Rejects a pending call with `Cancelled`.
    ///
    /// Idempotent: returns `false` if the call already terminated.
    pub fn cancel(&self, transaction_id: TransactionId) -> bool {
        let Some(call) = self.take(transaction_id) else {
            return false;
        };
        debug!("transaction {transaction_id} ({}) cancelled", call.type_name);
        call.settle(Err(RpcError::Cancelled(transaction_id)));
        true
    }

    /// Rejects every call whose deadline has passed with `Timeout`.
    ///
    /// Runs before every table lookup, so an overdue call is never matched,
    /// counted or reported as pending. Returns the number of calls expired.
    pub fn expire_overdue(&self) -> usize {
        let Ok(mut pending) = self.inner.pending.try_borrow_mut() else {
            return 0;
        };
        let expired = pending.remove_expired(Instant::now());
        drop(pending);

        let count = expired.len();
        for (transaction_id, call) in expired {
            warn!("transaction {transaction_id} ({}) timed out", call.type_name);
            call.settle(Err(RpcError::Timeout(transaction_id)));
        }
        count
    }

    /// Sweeps overdue calls on a fixed interval, so deadlines fire even when
    /// nobody awaits the reply or touches the client.
    pub async fn reap_expired(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let expired = self.expire_overdue();
            if expired > 0 {
                debug!("reaped {expired} expired call(s)");
            }
        }
    }

    /// Rejects every outstanding call with `Shutdown`.
    ///
    /// Returns the number of calls rejected. The client remains usable.
    pub fn shutdown(&self) -> usize {
        self.expire_overdue();
        let drained = self.inner.pending.borrow_mut().drain();
        let count = drained.len();
        for (_, call) in drained {
            call.settle(Err(RpcError::Shutdown));
        }
        if count > 0 {
            info!("shutdown rejected {count} pending call(s)");
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.expire_overdue();
        self.inner.pending.borrow().len()
    }

    pub fn is_pending(&self, transaction_id: TransactionId) -> bool {
        self.expire_overdue();
        self.inner.pending.borrow().contains(transaction_id)
    }

    fn take(&self, transaction_id: TransactionId) -> Option<PendingCall> {
        self.expire_overdue();
        let call = self.inner.pending.borrow_mut().take(transaction_id);
        if call.is_none() {
            debug!("no pending call for transaction {transaction_id}; ignored");
        }
        call
    }
}

/// Handle to the reply of one issued call.
///
/// Dropping it before it settles discards the pending entry, so an abandoned
/// call never lingers in the table.
#[derive(Debug)]
pub struct PendingReply {
    transaction_id: TransactionId,
    receiver: oneshot::Receiver<RpcResult<ResponsePayload>>,
    deadline: Instant,
    client: Weak<Inner>,
}

impl PendingReply {
    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    /// Waits for the call to settle or for its deadline to pass.
    pub async fn response(mut self) -> RpcResult<ResponsePayload> {
        match tokio::time::timeout_at(self.deadline, &mut self.receiver).await {
            Ok(Ok(outcome)) => outcome,
            // sender gone without settling: the client itself was dropped
            Ok(Err(_)) => Err(RpcError::Shutdown),
            Err(_) => {
                if self.discard() {
                    warn!("transaction {} timed out", self.transaction_id);
                }
                Err(RpcError::Timeout(self.transaction_id))
            }
        }
    }

    fn discard(&self) -> bool {
        let Some(inner) = self.client.upgrade() else {
            return false;
        };
        let Ok(mut pending) = inner.pending.try_borrow_mut() else {
            return false;
        };
        pending.take(self.transaction_id).is_some()
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if self.discard() {
            debug!(
                "reply handle for transaction {} dropped; pending call discarded",
                self.transaction_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingTransport {
        sent: RefCell<Vec<String>>,
    }

    impl Transport for RecordingTransport {
        fn send(&self, envelope: String) {
            self.sent.borrow_mut().push(envelope);
        }
    }

    impl RecordingTransport {
        fn sent_values(&self) -> Vec<Value> {
            self.sent
                .borrow()
                .iter()
                .map(|s| serde_json::from_str(s).unwrap())
                .collect()
        }
    }

    fn client_with_recorder() -> (RpcClient, Rc<RecordingTransport>) {
        let transport = Rc::new(RecordingTransport::default());
        let client = RpcClient::with_transport(ClientConfig::default(), transport.clone());
        (client, transport)
    }

    fn params(v: Value) -> Option<Map<String, Value>> {
        v.as_object().cloned()
    }

    #[tokio::test]
    async fn greet_round_trip_resolves_with_payload() {
        // arrange
        let (client, transport) = client_with_recorder();

        // act
        let reply = client.call("Greet", params(json!({"name": "Ada"}))).unwrap();
        let matched = client.handle_response(json!({"transactionId": 0, "value": "Hello, Ada"}));

        // assert
        assert!(matched);
        assert_eq!(
            transport.sent_values(),
            vec![json!({"type": "Greet", "parameters": {"name": "Ada"}, "transactionId": 0})]
        );
        assert_eq!(
            reply.response().await.unwrap(),
            json!({"transactionId": 0, "value": "Hello, Ada"})
        );
        assert_eq!(client.pending_count(), 0);
    }

    #[test]
    fn ids_follow_issue_order_from_zero() {
        let (client, transport) = client_with_recorder();

        let replies: Vec<_> = (0..4)
            .map(|_| client.call("GetTime", None).unwrap())
            .collect();

        let ids: Vec<_> = replies.iter().map(PendingReply::transaction_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        let sent_ids: Vec<_> = transport
            .sent_values()
            .iter()
            .map(|v| v["transactionId"].as_u64().unwrap())
            .collect();
        assert_eq!(sent_ids, vec![0, 1, 2, 3]);
        assert_eq!(client.pending_count(), 4);
    }

    #[test]
    fn missing_parameters_are_sent_as_empty_object() {
        let (client, transport) = client_with_recorder();

        let _reply = client.call("GetTime", None).unwrap();

        assert_eq!(transport.sent_values()[0]["parameters"], json!({}));
    }

    #[test]
    fn independent_clients_do_not_share_counters() {
        let (a, _ta) = client_with_recorder();
        let (b, _tb) = client_with_recorder();

        let ra = a.call("x", None).unwrap();
        let rb = b.call("x", None).unwrap();

        assert_eq!(ra.transaction_id(), 0);
        assert_eq!(rb.transaction_id(), 0);
    }

    #[test]
    fn call_without_transport_fails_immediately() {
        let client = RpcClient::default();

        let res = client.call("Greet", None);

        assert!(matches!(res, Err(RpcError::TransportUnavailable)));
        assert_eq!(client.pending_count(), 0);
    }

    #[test]
    fn transport_injected_later_is_used_and_ids_start_at_zero() {
        let client = RpcClient::default();
        assert!(client.call("Greet", None).is_err());
        let transport = Rc::new(RecordingTransport::default());

        client.set_transport(transport.clone());
        let reply = client.call("Greet", None).unwrap();

        assert_eq!(reply.transaction_id(), 0);
        assert_eq!(transport.sent.borrow().len(), 1);
    }

    #[tokio::test]
    async fn second_resolution_is_a_no_op() {
        let (client, _t) = client_with_recorder();
        let reply = client.call("Greet", None).unwrap();

        assert!(client.handle_response(json!({"transactionId": 0, "value": 1})));
        assert!(!client.handle_response(json!({"transactionId": 0, "value": 2})));
        assert!(!client.handle_error(0, "late"));

        assert_eq!(
            reply.response().await.unwrap(),
            json!({"transactionId": 0, "value": 1})
        );
    }

    #[tokio::test]
    async fn unknown_id_does_not_disturb_other_calls() {
        let (client, _t) = client_with_recorder();
        let first = client.call("a", None).unwrap();
        let second = client.call("b", None).unwrap();

        assert!(!client.handle_response(json!({"transactionId": 99, "value": "stray"})));

        assert_eq!(client.pending_count(), 2);
        assert!(client.handle_response(json!({"transactionId": 1, "value": "b"})));
        assert!(client.handle_response(json!({"transactionId": 0, "value": "a"})));
        assert_eq!(first.response().await.unwrap()["value"], "a");
        assert_eq!(second.response().await.unwrap()["value"], "b");
    }

    #[tokio::test]
    async fn malformed_responses_are_dropped() {
        let (client, _t) = client_with_recorder();
        let _reply = client.call("a", None).unwrap();

        assert!(!client.handle_response(json!({"value": "no id"})));
        assert!(!client.handle_response(json!({"transactionId": "0"})));
        assert!(!client.handle_inbound("not json"));
        assert!(!client.handle_inbound(r#"{"type":"Error","error":"no id"}"#));

        assert!(client.is_pending(0));
    }

    #[tokio::test]
    async fn handle_error_rejects_with_remote_error() {
        let (client, _t) = client_with_recorder();
        let reply = client.call("Greet", None).unwrap();

        assert!(client.handle_error(0, "Missing parameter: name"));

        assert_eq!(
            reply.response().await,
            Err(RpcError::Remote("Missing parameter: name".into()))
        );
    }

    #[tokio::test]
    async fn inbound_error_envelope_routes_to_error_path() {
        let (client, _t) = client_with_recorder();
        let reply = client.call("Greet", None).unwrap();

        assert!(client.handle_inbound(
            r#"{"transactionId":0,"type":"Error","error":"Missing parameter: name"}"#
        ));

        assert_eq!(
            reply.response().await,
            Err(RpcError::Remote("Missing parameter: name".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_call_times_out_and_late_response_is_ignored() {
        // arrange
        let transport = Rc::new(RecordingTransport::default());
        let config = ClientConfig {
            timeout: Duration::from_secs(10),
        };
        let client = RpcClient::with_transport(config, transport);
        let reply = client.call("Greet", None).unwrap();

        // act
        let res = reply.response().await;

        // assert
        assert_eq!(res, Err(RpcError::Timeout(0)));
        assert!(!client.is_pending(0));
        assert!(!client.handle_response(json!({"transactionId": 0, "value": "late"})));
    }

    #[tokio::test(start_paused = true)]
    async fn overdue_call_expires_without_being_awaited() {
        // arrange
        let (client, _t) = client_with_recorder();
        let reply = client.call("Greet", None).unwrap();

        // act
        tokio::time::advance(Duration::from_secs(30)).await;
        let late = client.handle_response(json!({"transactionId": 0, "value": "late"}));

        // assert
        assert!(!late);
        assert!(!client.is_pending(0));
        assert_eq!(client.pending_count(), 0);
        assert_eq!(reply.response().await, Err(RpcError::Timeout(0)));
    }

    #[tokio::test(start_paused = true)]
    async fn reaper_clears_overdue_calls_from_the_table() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (client, _t) = client_with_recorder();
                let reaper = tokio::task::spawn_local({
                    let client = client.clone();
                    async move { client.reap_expired(Duration::from_secs(1)).await }
                });
                let _expired = client.call("a", None).unwrap();

                tokio::time::sleep(Duration::from_secs(12)).await;

                assert_eq!(client.inner.pending.borrow().len(), 0);
                reaper.abort();
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_leaves_calls_within_their_deadline() {
        let (client, _t) = client_with_recorder();
        let early = client.call("a", None).unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        let later = client.call("b", None).unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;

        assert!(!client.is_pending(early.transaction_id()));
        assert!(client.is_pending(later.transaction_id()));
        assert!(client.handle_response(json!({"transactionId": 1, "value": "b"})));
        assert_eq!(later.response().await.unwrap()["value"], "b");
    }

    #[test]
    fn empty_type_is_rejected_before_sending() {
        let (client, transport) = client_with_recorder();

        let res = client.call("", None);

        assert!(matches!(res, Err(RpcError::EmptyType)));
        assert!(transport.sent.borrow().is_empty());
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn response_before_deadline_wins() {
        let (client, _t) = client_with_recorder();
        let reply = client.call("Greet", None).unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        client.handle_response(json!({"transactionId": 0, "value": "just in time"}));

        assert_eq!(reply.response().await.unwrap()["value"], "just in time");
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let (client, _t) = client_with_recorder();
        let reply = client.call("Greet", None).unwrap();

        assert!(client.cancel(0));
        assert!(!client.cancel(0));
        assert!(!client.handle_response(json!({"transactionId": 0})));

        assert_eq!(reply.response().await, Err(RpcError::Cancelled(0)));
    }

    #[tokio::test]
    async fn shutdown_rejects_every_pending_call() {
        let (client, _t) = client_with_recorder();
        let a = client.call("a", None).unwrap();
        let b = client.call("b", None).unwrap();

        assert_eq!(client.shutdown(), 2);

        assert_eq!(client.pending_count(), 0);
        assert_eq!(a.response().await, Err(RpcError::Shutdown));
        assert_eq!(b.response().await, Err(RpcError::Shutdown));
        assert_eq!(client.shutdown(), 0);
    }

    #[tokio::test]
    async fn dropping_the_client_rejects_outstanding_replies() {
        let (client, _t) = client_with_recorder();
        let reply = client.call("a", None).unwrap();

        drop(client);

        assert_eq!(reply.response().await, Err(RpcError::Shutdown));
    }

    #[test]
    fn dropping_a_reply_discards_its_entry() {
        let (client, _t) = client_with_recorder();
        let reply = client.call("a", None).unwrap();
        let keep = client.call("b", None).unwrap();

        drop(reply);

        assert!(!client.is_pending(0));
        assert!(client.is_pending(keep.transaction_id()));
    }

    #[tokio::test]
    async fn request_awaits_pumped_response() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        let (client, _t) = client_with_recorder();
        let pump_client = client.clone();

        let request = client.request("Greet", params(json!({"name": "Ada"})));
        let deliver = async move {
            tx.send(r#"{"transactionId":0,"type":"User","value":{"name":"Ada","age":29}}"#.into())
                .unwrap();
            drop(tx);
            pump_client.pump(rx).await;
        };
        let (res, ()) = tokio::join!(request, deliver);

        assert_eq!(res.unwrap()["value"]["name"], "Ada");
    }
}
