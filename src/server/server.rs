use crate::engine::{LocalAdmission, SharedEngineState, SubmitError};
use crate::gossip::StreamSession;
use crate::grpc::replicated_document_server::{ReplicatedDocument, ReplicatedDocumentServer};
use crate::grpc::{
    ProtoReadSequenceTableReq, ProtoReadSnapshotReq, ProtoSequenceTable, ProtoSnapshot, ProtoTransaction,
    ProtoWriteReq, ProtoWriteResult,
};
use crate::server::ShutdownSignal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::{ReceiverStream, TcpListenerStream};
use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};

/// RpcServer is the type that implements the document gRPC interface. Local viewers and peer
/// nodes use the same service.
pub(crate) struct RpcServer {
    logger: slog::Logger,
    admission: Arc<LocalAdmission>,
    state: SharedEngineState,
    session: StreamSession,
}

impl RpcServer {
    pub(crate) fn new(
        logger: slog::Logger,
        admission: Arc<LocalAdmission>,
        state: SharedEngineState,
        session: StreamSession,
    ) -> Self {
        RpcServer {
            logger,
            admission,
            state,
            session,
        }
    }

    pub(crate) async fn run(self, listener: TcpListener, shutdown_signal: ShutdownSignal) {
        let logger = self.logger.clone();
        match listener.local_addr() {
            Ok(addr) => slog::info!(logger, "Listening on '{:?}'", addr),
            Err(e) => slog::warn!(logger, "Listening on unknown address: {:?}", e),
        }

        let result = Server::builder()
            .add_service(ReplicatedDocumentServer::new(self))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown_signal.wait())
            .await;

        slog::info!(logger, "Server run() has exited: {:?}", result);
    }

    async fn handle_write(&self, rpc_request: ProtoWriteReq) -> Result<ProtoWriteResult, Status> {
        self.admission
            .write(rpc_request.payload)
            .await
            .map_err(Self::convert_submit_error)?;

        Ok(ProtoWriteResult {
            // Empty
        })
    }

    fn handle_read_snapshot(&self) -> ProtoSnapshot {
        ProtoSnapshot {
            document: self.state.read_document().to_string(),
        }
    }

    fn handle_read_sequence_table(&self) -> ProtoSequenceTable {
        ProtoSequenceTable {
            highest_applied_ids: self.state.read_sequence_table().into_iter().collect(),
        }
    }

    fn handle_subscribe(&self, inbound: Streaming<ProtoTransaction>) -> ReceiverStream<Result<ProtoTransaction, Status>> {
        // The response stream reports its own end to the caller, so the pump task needs no
        // watching here.
        let outbound = self.session.open_outbound();
        let subscriber_id = outbound.subscriber_id;

        let logger = self.logger.new(slog::o!("subscriber" => subscriber_id.as_u64()));
        let session = self.session.clone();
        tokio::spawn(async move {
            match session.pump_inbound(inbound).await {
                Ok(()) => slog::debug!(logger, "Inbound stream closed."),
                Err(e) => slog::warn!(logger, "Inbound stream failed: {}", e),
            }
        });

        outbound.stream
    }

    fn convert_submit_error(e: SubmitError) -> Status {
        match e {
            SubmitError::EngineExited => Status::unavailable("Server internal apply engine task has exited"),
        }
    }
}

#[async_trait::async_trait]
impl ReplicatedDocument for RpcServer {
    async fn write(&self, rpc_request_wrapped: Request<ProtoWriteReq>) -> Result<Response<ProtoWriteResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_write(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn read_snapshot(
        &self,
        _rpc_request_wrapped: Request<ProtoReadSnapshotReq>,
    ) -> Result<Response<ProtoSnapshot>, Status> {
        Ok(Response::new(self.handle_read_snapshot()))
    }

    async fn read_sequence_table(
        &self,
        _rpc_request_wrapped: Request<ProtoReadSequenceTableReq>,
    ) -> Result<Response<ProtoSequenceTable>, Status> {
        Ok(Response::new(self.handle_read_sequence_table()))
    }

    type SubscribeStream = ReceiverStream<Result<ProtoTransaction, Status>>;

    async fn subscribe(
        &self,
        rpc_request_wrapped: Request<Streaming<ProtoTransaction>>,
    ) -> Result<Response<Self::SubscribeStream>, Status> {
        let outbound = self.handle_subscribe(rpc_request_wrapped.into_inner());

        Ok(Response::new(outbound))
    }
}
