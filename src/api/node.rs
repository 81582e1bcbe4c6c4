use crate::api::wiring::{self, InvalidPeerUri};
use crate::engine::{IntakeClient, LocalAdmission, SharedEngineState, SubmitError, Transaction};
use crate::fanout::Subscription;
use crate::gossip::{PeerSession, StreamSession};
use crate::server::{ShutdownHandle, ShutdownSignal};
use bytes::Bytes;
use serde_json::Value;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::Duration;
use tonic::transport::Endpoint;

/// DocNode is the handle to one running node. Dropping it shuts the node down.
pub struct DocNode {
    logger: slog::Logger,
    admission: Arc<LocalAdmission>,
    intake: IntakeClient,
    state: SharedEngineState,
    session: StreamSession,
    local_addr: Option<SocketAddr>,
    reconnect_backoff: Duration,
    shutdown_handle: ShutdownHandle,
    shutdown_signal: ShutdownSignal,
}

/// Everything `DocNode` holds on to, once wiring has spawned the background tasks.
pub(super) struct NodeParts {
    pub(super) logger: slog::Logger,
    pub(super) admission: Arc<LocalAdmission>,
    pub(super) intake: IntakeClient,
    pub(super) state: SharedEngineState,
    pub(super) session: StreamSession,
    pub(super) local_addr: Option<SocketAddr>,
    pub(super) reconnect_backoff: Duration,
    pub(super) shutdown_handle: ShutdownHandle,
    pub(super) shutdown_signal: ShutdownSignal,
}

impl DocNode {
    pub(super) fn new(parts: NodeParts) -> Self {
        let NodeParts {
            logger,
            admission,
            intake,
            state,
            session,
            local_addr,
            reconnect_backoff,
            shutdown_handle,
            shutdown_signal,
        } = parts;

        DocNode {
            logger,
            admission,
            intake,
            state,
            session,
            local_addr,
            reconnect_backoff,
            shutdown_handle,
            shutdown_signal,
        }
    }

    /// Admits a JSON Patch written on this node and returns the id it was assigned.
    ///
    /// `Ok` only means the transaction was queued. A patch that turns out to be invalid is
    /// dropped by the engine without telling the writer.
    pub async fn write(&self, payload: impl Into<String>) -> Result<u64, WriteError> {
        let id = self.admission.write(payload.into()).await?;
        Ok(id)
    }

    /// Queues a transaction verbatim, as if it had arrived from a peer.
    pub async fn submit(&self, transaction: Transaction) -> Result<(), WriteError> {
        self.intake.submit(transaction).await?;
        Ok(())
    }

    /// Current document as JSON. Object keys are sorted, so two nodes with the same document
    /// return the same bytes.
    pub fn read_snapshot(&self) -> Bytes {
        Bytes::from(self.state.read_document().to_string())
    }

    pub fn read_document(&self) -> Value {
        self.state.read_document()
    }

    /// Highest applied id per source.
    pub fn read_sequence_table(&self) -> BTreeMap<String, u64> {
        self.state.read_sequence_table()
    }

    pub fn subscribe(&self) -> Subscription {
        self.state.attach()
    }

    /// Number of transactions in the write-ahead log, which is also how many a new subscriber
    /// gets replayed.
    pub fn wal_len(&self) -> usize {
        self.state.wal_len()
    }

    pub fn source(&self) -> &str {
        self.admission.source()
    }

    /// Address the gRPC server is bound to. `None` for in-process nodes.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Starts gossiping with one more peer. Sessions can't be removed again, short of shutting
    /// the node down.
    pub fn add_peer(&self, peer: &str) -> Result<(), InvalidPeerUri> {
        let endpoint = wiring::peer_endpoint(peer)?;
        self.spawn_peer_session(peer, endpoint);

        Ok(())
    }

    pub(super) fn spawn_peer_session(&self, peer: &str, endpoint: Endpoint) {
        let logger = self.logger.new(slog::o!("peer" => peer.to_string()));

        let peer_session = PeerSession::new(
            logger,
            endpoint,
            self.session.clone(),
            self.reconnect_backoff,
            self.shutdown_signal.clone(),
        );
        tokio::spawn(peer_session.run());
    }

    /// Stops the gRPC server and every gossip session. Reads keep working on the frozen state.
    pub fn shutdown(&self) {
        slog::info!(self.logger, "Shutting down.");
        self.shutdown_handle.shutdown();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    // Engine logic runs on a background task. This error is returned if the task has exited.
    #[error("Apply engine task has exited")]
    EngineExited,
}

// ------- Conversions -------

impl From<SubmitError> for WriteError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::EngineExited => WriteError::EngineExited,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{try_create_node, NodeConfig, NodeOptions};
    use crate::test_utils::{recv_with_sanity_timeout, test_logger};
    use serde_json::json;

    fn in_process_config(source: &str) -> NodeConfig {
        NodeConfig {
            source: source.to_string(),
            listen_addr: None,
            peers: vec![],
            logger: test_logger(),
            options: NodeOptions::default(),
        }
    }

    #[tokio::test]
    async fn local_write_is_applied() {
        let node = try_create_node(in_process_config("A")).await.unwrap();
        let mut subscription = node.subscribe();

        let id = node.write(r#"[{"op": "add", "path": "/x", "value": 1}]"#).await.unwrap();
        let applied = recv_with_sanity_timeout(subscription.next()).await.unwrap();

        assert_eq!(id, 1);
        assert_eq!((applied.source.as_str(), applied.id), ("A", 1));
        assert_eq!(node.read_document(), json!({"x": 1}));
        assert_eq!(&node.read_snapshot()[..], br#"{"x":1}"#);
        assert_eq!(node.read_sequence_table().get("A"), Some(&1));
        assert_eq!(node.wal_len(), 1);
        assert_eq!(node.source(), "A");
        assert!(node.local_addr().is_none());
    }

    #[tokio::test]
    async fn invalid_write_is_dropped_quietly() {
        let node = try_create_node(in_process_config("A")).await.unwrap();
        let mut subscription = node.subscribe();

        node.write("definitely not a patch").await.unwrap();
        node.write(r#"[{"op": "add", "path": "/ok", "value": true}]"#).await.unwrap();

        // Only the second write made it into the log.
        let applied = recv_with_sanity_timeout(subscription.next()).await.unwrap();
        assert_eq!(applied.id, 2);
        assert_eq!(node.read_document(), json!({"ok": true}));
        assert_eq!(node.wal_len(), 1);
    }

    #[tokio::test]
    async fn non_ascii_write_is_kept_verbatim() {
        let node = try_create_node(in_process_config("A")).await.unwrap();
        let mut subscription = node.subscribe();
        let payload = r#"[{"op": "add", "path": "/straße", "value": "日本"}]"#;

        node.write(payload).await.unwrap();
        let applied = recv_with_sanity_timeout(subscription.next()).await.unwrap();

        assert_eq!(applied.payload, payload);
        assert_eq!(node.read_document(), json!({"straße": "日本"}));
    }

    #[tokio::test]
    async fn add_peer_rejects_garbage_uri() {
        let node = try_create_node(in_process_config("A")).await.unwrap();

        assert!(node.add_peer("http://bad host:1").is_err());
    }
}
