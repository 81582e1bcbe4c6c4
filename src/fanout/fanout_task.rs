use crate::engine::Transaction;
use crate::fanout::publisher::FanoutEvent;
use crate::fanout::subscription::{LagFlag, SubscriberId};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

struct Subscriber {
    sender: mpsc::Sender<Transaction>,
    lag_flag: LagFlag,
}

/// FanoutTask is the only place committed transactions are copied to subscribers. It runs on
/// its own task so that a slow subscriber can never hold up the apply engine.
///
/// Slow subscriber policy: each subscriber has a bounded queue. If a delivery finds the queue
/// full, the subscriber is disconnected and flagged as lagged. Nothing waits and nothing piles
/// up behind a subscriber that stopped reading.
pub(crate) struct FanoutTask {
    logger: slog::Logger,
    receiver: mpsc::UnboundedReceiver<FanoutEvent>,
    subscribers: HashMap<SubscriberId, Subscriber>,
}

impl FanoutTask {
    pub(super) fn new(logger: slog::Logger, receiver: mpsc::UnboundedReceiver<FanoutEvent>) -> Self {
        FanoutTask {
            logger,
            receiver,
            subscribers: HashMap::new(),
        }
    }

    /// Runs until every publisher and subscription has been dropped.
    pub(crate) async fn run(mut self) {
        while let Some(event) = self.receiver.recv().await {
            self.handle_event(event);
        }

        slog::info!(self.logger, "Fan-out task has exited.");
    }

    // This must NOT be async. Waiting here would let one subscriber stall all others.
    fn handle_event(&mut self, event: FanoutEvent) {
        match event {
            FanoutEvent::Register { id, sender, lag_flag } => {
                slog::info!(self.logger, "Subscriber {:?} attached.", id);
                self.subscribers.insert(id, Subscriber { sender, lag_flag });
            }
            FanoutEvent::Unregister(id) => {
                if self.subscribers.remove(&id).is_some() {
                    slog::info!(self.logger, "Subscriber {:?} detached.", id);
                }
            }
            FanoutEvent::Deliver(transaction) => {
                self.broadcast(transaction);
            }
        }
    }

    fn broadcast(&mut self, transaction: Transaction) {
        let mut disconnected = Vec::new();

        for (id, subscriber) in self.subscribers.iter() {
            match subscriber.sender.try_send(transaction.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    slog::warn!(
                        self.logger,
                        "Subscriber {:?} queue is full. Disconnecting lagging subscriber.",
                        id
                    );
                    subscriber.lag_flag.mark_lagged();
                    disconnected.push(*id);
                }
                Err(TrySendError::Closed(_)) => {
                    // Receiver went away without an explicit detach. Clean up.
                    disconnected.push(*id);
                }
            }
        }

        for id in disconnected {
            self.subscribers.remove(&id);
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
