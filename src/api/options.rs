use std::convert::TryFrom;
use tokio::time::Duration;

/// Tuning knobs for a node. Every field falls back to a default when left as `None`.
#[derive(Clone, Debug, Default)]
pub struct NodeOptions {
    /// How many transactions can wait for the apply engine before `submit()` starts waiting.
    pub intake_queue_capacity: Option<usize>,
    /// How far a subscriber may fall behind before it gets disconnected.
    pub subscriber_queue_capacity: Option<usize>,
    /// How long a gossip session waits before redialing a peer.
    pub reconnect_backoff: Option<Duration>,
    /// Buffer between a subscription and the gRPC stream it's written to.
    pub outbound_stream_capacity: Option<usize>,
}

#[derive(Debug)]
pub(super) struct NodeOptionsValidated {
    pub intake_queue_capacity: usize,
    pub subscriber_queue_capacity: usize,
    pub reconnect_backoff: Duration,
    pub outbound_stream_capacity: usize,
}

impl NodeOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.intake_queue_capacity == 0 {
            return Err("Intake queue capacity must be greater than 0");
        }
        if self.subscriber_queue_capacity == 0 {
            return Err("Subscriber queue capacity must be greater than 0");
        }
        if self.reconnect_backoff == Duration::from_secs(0) {
            return Err("Reconnect backoff must be greater than 0");
        }
        if self.outbound_stream_capacity == 0 {
            return Err("Outbound stream capacity must be greater than 0");
        }

        Ok(())
    }
}

impl TryFrom<NodeOptions> for NodeOptionsValidated {
    type Error = &'static str;

    fn try_from(options: NodeOptions) -> Result<Self, Self::Error> {
        let values = NodeOptionsValidated {
            intake_queue_capacity: options.intake_queue_capacity.unwrap_or(30),
            subscriber_queue_capacity: options.subscriber_queue_capacity.unwrap_or(1024),
            reconnect_backoff: options.reconnect_backoff.unwrap_or(Duration::from_secs(5)),
            outbound_stream_capacity: options.outbound_stream_capacity.unwrap_or(64),
        };

        values.validate()?;
        Ok(values)
    }
}
