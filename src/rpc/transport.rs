use crate::services::host_service::HostService;
use log::error;
use tokio::sync::mpsc::UnboundedSender;

/// One-way channel to the host process.
///
/// `send` has no return path: responses come back later through whatever
/// inbound channel the host was wired to.
pub trait Transport {
    fn send(&self, envelope: String);
}

/// Runs the host in-process and queues its responses on an inbound channel.
///
/// Responses are never delivered from inside `send`; the client's pump picks
/// them up on a later turn of the event loop.
pub struct LoopbackTransport {
    host: HostService,
    inbound: UnboundedSender<String>,
}

impl LoopbackTransport {
    pub fn new(host: HostService, inbound: UnboundedSender<String>) -> Self {
        Self { host, inbound }
    }
}

impl Transport for LoopbackTransport {
    fn send(&self, envelope: String) {
        let Some(response) = self.host.handle(&envelope) else {
            return;
        };
        if self.inbound.send(response).is_err() {
            error!("inbound channel closed; response dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    #[test]
    fn loopback_queues_host_response() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport = LoopbackTransport::new(HostService::default(), tx);

        transport.send(r#"{"type":"IncrementCounter","parameters":{"value":41},"transactionId":9}"#.into());

        let raw = rx.try_recv().expect("response queued");
        let v: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v, json!({"transactionId": 9, "type": "i32", "value": 42}));
    }

    #[test]
    fn loopback_queues_nothing_for_unknown_type() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport = LoopbackTransport::new(HostService::default(), tx);

        transport.send(r#"{"type":"Nope","parameters":{},"transactionId":1}"#.into());

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn loopback_survives_closed_inbound() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let transport = LoopbackTransport::new(HostService::default(), tx);

        transport.send(r#"{"type":"GetTime","transactionId":0}"#.into());
    }
}
