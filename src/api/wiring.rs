use crate::api::node::{DocNode, NodeParts};
use crate::api::options::{NodeOptions, NodeOptionsValidated};
use crate::engine::{self, JsonPatchStrategy, LocalAdmission, PatchStrategy};
use crate::gossip::StreamSession;
use crate::server::{self, RpcServer};
use std::convert::TryFrom;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tonic::codegen::http::uri;
use tonic::transport::Endpoint;

pub struct NodeConfig {
    // Label for transactions written on this node. Must be unique in the cluster.
    pub source: String,
    // `None` runs the node in-process only: no server, so nobody can dial in.
    pub listen_addr: Option<SocketAddr>,
    // Endpoints to gossip with, e.g. "http://10.0.0.2:7000" or just "10.0.0.2:7000".
    pub peers: Vec<String>,
    pub logger: slog::Logger,
    pub options: NodeOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum NodeCreationError {
    #[error("Illegal options for configuring node: {0}")]
    IllegalOptions(String),
    #[error("Source label must not be empty")]
    EmptySource,
    #[error(transparent)]
    InvalidPeerUri(#[from] InvalidPeerUri),
    #[error("Failed to bind server address")]
    Bind(#[source] io::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid peer URI '{uri}'")]
pub struct InvalidPeerUri {
    uri: String,
    #[source]
    source: uri::InvalidUri,
}

pub async fn try_create_node(config: NodeConfig) -> Result<DocNode, NodeCreationError> {
    try_create_node_with_patch_strategy(config, JsonPatchStrategy).await
}

/// Like `try_create_node()`, but documents are edited by `patch_strategy`. Every node in a
/// cluster has to use the same strategy.
pub async fn try_create_node_with_patch_strategy<P: PatchStrategy>(
    config: NodeConfig,
    patch_strategy: P,
) -> Result<DocNode, NodeCreationError> {
    if config.source.is_empty() {
        return Err(NodeCreationError::EmptySource);
    }

    let options = NodeOptionsValidated::try_from(config.options)
        .map_err(|e| NodeCreationError::IllegalOptions(e.to_string()))?;

    // Validate everything before spawning anything, so a bad config leaves nothing running.
    let mut peer_endpoints = Vec::with_capacity(config.peers.len());
    for peer in &config.peers {
        peer_endpoints.push((peer.clone(), peer_endpoint(peer)?));
    }

    let listener = match config.listen_addr {
        Some(addr) => Some(TcpListener::bind(addr).await.map_err(NodeCreationError::Bind)?),
        None => None,
    };
    let local_addr = match &listener {
        Some(listener) => Some(listener.local_addr().map_err(NodeCreationError::Bind)?),
        None => None,
    };

    let root_logger = config.logger.new(slog::o!("source" => config.source.clone()));

    let engine::EngineParts {
        apply_engine,
        fanout_task,
        intake,
        state,
    } = engine::wired(
        root_logger.clone(),
        patch_strategy,
        options.intake_queue_capacity,
        options.subscriber_queue_capacity,
    );
    tokio::spawn(apply_engine.run());
    tokio::spawn(fanout_task.run());

    let (shutdown_handle, shutdown_signal) = server::shutdown_signal();

    let admission = Arc::new(LocalAdmission::new(config.source, intake.clone()));
    let session = StreamSession::new(
        root_logger.new(slog::o!("component" => "session")),
        state.clone(),
        intake.clone(),
        options.outbound_stream_capacity,
        shutdown_signal.clone(),
    );

    if let Some(listener) = listener {
        let rpc_server = RpcServer::new(
            root_logger.new(slog::o!("component" => "server")),
            admission.clone(),
            state.clone(),
            session.clone(),
        );
        tokio::spawn(rpc_server.run(listener, shutdown_signal.clone()));
    }

    let node = DocNode::new(NodeParts {
        logger: root_logger,
        admission,
        intake,
        state,
        session,
        local_addr,
        reconnect_backoff: options.reconnect_backoff,
        shutdown_handle,
        shutdown_signal,
    });

    for (peer, endpoint) in peer_endpoints {
        node.spawn_peer_session(&peer, endpoint);
    }

    Ok(node)
}

/// Accepts bare "host:port" as well as full URIs. Bare addresses are dialed over plain http.
pub(crate) fn peer_endpoint(peer: &str) -> Result<Endpoint, InvalidPeerUri> {
    let uri = peer_uri(peer);

    Endpoint::from_shared(uri.clone()).map_err(|source| InvalidPeerUri { uri, source })
}

fn peer_uri(peer: &str) -> String {
    if peer.contains("://") {
        peer.to_string()
    } else {
        format!("http://{}", peer)
    }
}
