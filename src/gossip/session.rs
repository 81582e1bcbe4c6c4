use crate::engine::{IntakeClient, SharedEngineState, SubmitError, Transaction};
use crate::fanout::{DropReason, SubscriberId, Subscription};
use crate::grpc::ProtoTransaction;
use crate::server::ShutdownSignal;
use std::convert::TryFrom;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tonic::codegen::http::uri;
use tonic::{Status, Streaming};

/// StreamSession is both halves of a `Subscribe` stream, from the local node's point of view.
/// The same session logic runs on the server side of the call and on the dialing side.
///
/// - Outbound: attach to the local fan-out and send the history and then live transactions.
/// - Inbound: decode every message the other side sends and submit it to the local engine.
#[derive(Clone)]
pub(crate) struct StreamSession {
    logger: slog::Logger,
    state: SharedEngineState,
    intake: IntakeClient,
    outbound_capacity: usize,
    shutdown: ShutdownSignal,
}

impl StreamSession {
    pub(crate) fn new(
        logger: slog::Logger,
        state: SharedEngineState,
        intake: IntakeClient,
        outbound_capacity: usize,
        shutdown: ShutdownSignal,
    ) -> Self {
        StreamSession {
            logger,
            state,
            intake,
            outbound_capacity,
            shutdown,
        }
    }

    /// Attaches a new subscriber and spawns the task that copies its transactions into the
    /// returned stream. The task ends when the stream is dropped, the subscription ends, or the
    /// node shuts down. Ending the task ends the stream.
    ///
    /// The returned handle resolves once the task is done. A caller that owns both halves of a
    /// session has to watch it, since a stream that just stops sending looks healthy to the
    /// other side.
    pub(crate) fn open_outbound<M: OutboundMessage>(&self) -> Outbound<M> {
        let subscription = self.state.attach();
        let subscriber_id = subscription.id();
        let logger = self.logger.new(slog::o!("subscriber" => subscriber_id.as_u64()));
        let (tx, rx) = mpsc::channel(self.outbound_capacity);

        let task = tokio::spawn(pump_outbound(logger, subscription, tx, self.shutdown.clone()));

        Outbound {
            subscriber_id,
            stream: ReceiverStream::new(rx),
            task,
        }
    }

    /// Submits everything the other side sends until it closes the stream. Returns early on the
    /// first bad message or transport error, or when the node shuts down.
    pub(crate) async fn pump_inbound(&self, mut inbound: Streaming<ProtoTransaction>) -> Result<(), SessionError> {
        let mut shutdown = Box::pin(self.shutdown.clone().wait());

        loop {
            let message = tokio::select! {
                message = inbound.message() => message?,
                _ = &mut shutdown => return Ok(()),
            };

            let proto = match message {
                Some(proto) => proto,
                None => return Ok(()),
            };
            slog::debug!(self.logger, "Wire - {:?}", proto);
            let transaction = Transaction::try_from(proto).map_err(SessionError::MalformedTransaction)?;

            tokio::select! {
                result = self.intake.submit(transaction) => result?,
                _ = &mut shutdown => return Ok(()),
            }
        }
    }
}

pub(crate) struct Outbound<M> {
    pub(crate) subscriber_id: SubscriberId,
    pub(crate) stream: ReceiverStream<M>,
    pub(crate) task: JoinHandle<OutboundEnd>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum OutboundEnd {
    // Stream dropped, subscription ended or node shutting down.
    Closed,
    // The fan-out disconnected the subscriber for falling behind.
    Lagged,
}

async fn pump_outbound<M: OutboundMessage>(
    logger: slog::Logger,
    mut subscription: Subscription,
    tx: mpsc::Sender<M>,
    shutdown: ShutdownSignal,
) -> OutboundEnd {
    let mut shutdown = Box::pin(shutdown.wait());
    let mut end = OutboundEnd::Closed;

    loop {
        let next = tokio::select! {
            next = subscription.next() => next,
            _ = tx.closed() => break,
            _ = &mut shutdown => break,
        };

        let message = match next {
            Some(transaction) => M::from_transaction(transaction.into()),
            None => {
                if let Some(DropReason::SubscriberLagged) = subscription.drop_reason() {
                    slog::warn!(logger, "Subscriber fell behind and was disconnected.");
                    end = OutboundEnd::Lagged;
                    if let Some(message) = M::lagged() {
                        tokio::select! {
                            _ = tx.send(message) => {}
                            _ = &mut shutdown => {}
                        }
                    }
                }
                break;
            }
        };

        let sent = tokio::select! {
            result = tx.send(message) => result.is_ok(),
            _ = &mut shutdown => false,
        };
        if !sent {
            break;
        }
    }

    slog::info!(logger, "Outbound stream closed: {:?}", end);
    end
}

/// What the outbound half of a session writes into its stream. The server's response stream
/// carries `Result`s, the dialer's request stream carries bare messages.
pub(crate) trait OutboundMessage: Send + 'static {
    fn from_transaction(proto: ProtoTransaction) -> Self;

    /// Final message to send after the subscriber was disconnected for lagging, if the stream
    /// type can express it.
    fn lagged() -> Option<Self>
    where
        Self: Sized;
}

impl OutboundMessage for ProtoTransaction {
    fn from_transaction(proto: ProtoTransaction) -> Self {
        proto
    }

    fn lagged() -> Option<Self> {
        None
    }
}

impl OutboundMessage for Result<ProtoTransaction, Status> {
    fn from_transaction(proto: ProtoTransaction) -> Self {
        Ok(proto)
    }

    fn lagged() -> Option<Self> {
        Some(Err(Status::resource_exhausted(
            "Subscriber fell behind and was disconnected. Subscribe again to resume.",
        )))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid peer URI")]
    InvalidUri(#[from] uri::InvalidUri),
    #[error("Failed to connect to peer")]
    Connect(#[from] tonic::transport::Error),
    #[error("Stream failed: {0}")]
    Stream(#[from] Status),
    #[error("Received malformed transaction: {0}")]
    MalformedTransaction(&'static str),
    #[error("Local apply engine has exited")]
    EngineExited,
    #[error("Outbound stream fell behind and was disconnected")]
    SubscriberLagged,
}

// ------- Conversions -------

impl From<SubmitError> for SessionError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::EngineExited => SessionError::EngineExited,
        }
    }
}

impl From<Transaction> for ProtoTransaction {
    fn from(transaction: Transaction) -> Self {
        ProtoTransaction {
            payload: transaction.payload,
            source: transaction.source,
            id: transaction.id,
        }
    }
}

impl TryFrom<ProtoTransaction> for Transaction {
    type Error = &'static str;

    fn try_from(proto: ProtoTransaction) -> Result<Self, Self::Error> {
        if proto.source.is_empty() {
            return Err("Transaction source must not be empty");
        }
        // Ids start at 1. An id of 0 would be discarded as a duplicate anyway.
        if proto.id == 0 {
            return Err("Transaction id must be greater than 0");
        }

        Ok(Transaction::new(proto.payload, proto.source, proto.id))
    }
}
