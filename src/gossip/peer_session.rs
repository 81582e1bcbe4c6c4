use crate::gossip::session::{Outbound, OutboundEnd, SessionError, StreamSession};
use crate::grpc::replicated_document_client::ReplicatedDocumentClient;
use crate::grpc::ProtoTransaction;
use crate::server::ShutdownSignal;
use tokio::time::Duration;
use tonic::transport::Endpoint;

/// PeerSession keeps one `Subscribe` stream open to one peer, forever. Every failure just sends
/// it back to waiting out the backoff and dialing again; there's no retry limit.
///
/// Since the peer replays its whole WAL on every connect, and we do the same towards it, each
/// reconnect doubles as a full anti-entropy pass. Dedup makes the replays harmless.
pub(crate) struct PeerSession {
    logger: slog::Logger,
    endpoint: Endpoint,
    session: StreamSession,
    reconnect_backoff: Duration,
    shutdown: ShutdownSignal,
}

impl PeerSession {
    pub(crate) fn new(
        logger: slog::Logger,
        endpoint: Endpoint,
        session: StreamSession,
        reconnect_backoff: Duration,
        shutdown: ShutdownSignal,
    ) -> Self {
        PeerSession {
            logger,
            endpoint,
            session,
            reconnect_backoff,
            shutdown,
        }
    }

    pub(crate) async fn run(self) {
        while !self.shutdown.is_shutdown() {
            match self.connect_and_stream().await {
                Ok(()) => slog::info!(self.logger, "Peer stream ended."),
                Err(e) => slog::warn!(self.logger, "Peer session failed: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_backoff) => {}
                _ = self.shutdown.clone().wait() => break,
            }
        }

        slog::info!(self.logger, "Peer session has exited.");
    }

    async fn connect_and_stream(&self) -> Result<(), SessionError> {
        let mut shutdown = Box::pin(self.shutdown.clone().wait());

        let channel = tokio::select! {
            result = self.endpoint.connect() => result?,
            _ = &mut shutdown => return Ok(()),
        };
        let mut client = ReplicatedDocumentClient::new(channel);

        let Outbound {
            subscriber_id,
            stream,
            mut task,
        } = self.session.open_outbound::<ProtoTransaction>();
        let exchange = async {
            let response = client.subscribe(stream).await?;
            slog::info!(self.logger, "Connected. Streaming as local subscriber {:?}.", subscriber_id);

            self.session.pump_inbound(response.into_inner()).await
        };

        // Either half ending ends the session. The next connect starts over with a full replay
        // in both directions.
        let result = tokio::select! {
            result = exchange => result,
            end = &mut task => match end {
                Ok(OutboundEnd::Lagged) => Err(SessionError::SubscriberLagged),
                _ => Ok(()),
            },
            _ = &mut shutdown => Ok(()),
        };
        task.abort();

        result
    }
}
