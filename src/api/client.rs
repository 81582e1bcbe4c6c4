use crate::engine::Transaction;
use crate::grpc::replicated_document_client::ReplicatedDocumentClient;
use crate::grpc::{ProtoReadSequenceTableReq, ProtoReadSnapshotReq, ProtoTransaction, ProtoWriteReq};
use serde_json::Value;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::codegen::http::uri;
use tonic::transport::{Channel, Endpoint};
use tonic::{Status, Streaming};

/// DocClient talks to a node over gRPC. Applications use it to write and read, tests use it to
/// look at nodes from the outside.
#[derive(Clone)]
pub struct DocClient {
    inner: ReplicatedDocumentClient<Channel>,
}

impl DocClient {
    pub async fn connect(uri: impl Into<String>) -> Result<Self, ClientError> {
        let endpoint = Endpoint::from_shared(uri.into())?;
        let connection = endpoint.connect().await?;

        Ok(DocClient {
            inner: ReplicatedDocumentClient::new(connection),
        })
    }

    /// Sends a JSON Patch to the node. Like a local write, success only means it was queued.
    pub async fn write(&mut self, payload: impl Into<String>) -> Result<(), ClientError> {
        let request = ProtoWriteReq { payload: payload.into() };
        self.inner.write(request).await?;

        Ok(())
    }

    pub async fn read_snapshot(&mut self) -> Result<Value, ClientError> {
        let reply = self.inner.read_snapshot(ProtoReadSnapshotReq {}).await?.into_inner();

        serde_json::from_str(&reply.document).map_err(ClientError::MalformedSnapshot)
    }

    pub async fn read_sequence_table(&mut self) -> Result<BTreeMap<String, u64>, ClientError> {
        let reply = self
            .inner
            .read_sequence_table(ProtoReadSequenceTableReq {})
            .await?
            .into_inner();

        Ok(reply.highest_applied_ids.into_iter().collect())
    }

    /// Opens a `Subscribe` stream. The node replays its history first, then live transactions.
    /// Anything sent through `RemoteSubscription::send()` is submitted on the node as if it came
    /// from a peer.
    pub async fn subscribe(&mut self) -> Result<RemoteSubscription, ClientError> {
        let (tx, rx) = mpsc::channel(16);
        let inbound = self.inner.subscribe(ReceiverStream::new(rx)).await?.into_inner();

        Ok(RemoteSubscription { outbound: tx, inbound })
    }
}

pub struct RemoteSubscription {
    outbound: mpsc::Sender<ProtoTransaction>,
    inbound: Streaming<ProtoTransaction>,
}

impl RemoteSubscription {
    /// `Ok(None)` once the node ends the stream.
    pub async fn next(&mut self) -> Result<Option<Transaction>, ClientError> {
        match self.inbound.message().await? {
            Some(proto) => {
                let transaction = Transaction::try_from(proto).map_err(ClientError::MalformedTransaction)?;
                Ok(Some(transaction))
            }
            None => Ok(None),
        }
    }

    pub async fn send(&self, transaction: Transaction) -> Result<(), ClientError> {
        self.outbound
            .send(ProtoTransaction::from(transaction))
            .await
            .map_err(|_| ClientError::StreamClosed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid URI")]
    InvalidUri(#[from] uri::InvalidUri),
    #[error("Failed to connect")]
    Connect(#[from] tonic::transport::Error),
    #[error("RPC failed: {0}")]
    Rpc(#[from] Status),
    #[error("Received malformed transaction: {0}")]
    MalformedTransaction(&'static str),
    #[error("Received malformed snapshot")]
    MalformedSnapshot(#[source] serde_json::Error),
    #[error("Subscription stream is closed")]
    StreamClosed,
}
