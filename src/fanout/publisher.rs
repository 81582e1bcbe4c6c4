use crate::engine::Transaction;
use crate::fanout::subscription::{LagFlag, SubscriberId, Subscription};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// FanoutEvent is everything the fan-out task reacts to. All three travel over the same FIFO
/// queue, which is what gives a new subscriber an exact boundary between the history it was
/// handed at attach time and the live transactions that follow.
#[derive(Debug)]
pub(super) enum FanoutEvent {
    Register {
        id: SubscriberId,
        sender: mpsc::Sender<Transaction>,
        lag_flag: LagFlag,
    },
    Unregister(SubscriberId),
    Deliver(Transaction),
}

/// FanoutPublisher is the engine side of the fan-out task. It never blocks: the queue to the
/// fan-out task is unbounded, and the fan-out task itself never waits on a subscriber.
#[derive(Clone)]
pub(crate) struct FanoutPublisher {
    logger: slog::Logger,
    sender: mpsc::UnboundedSender<FanoutEvent>,
    next_subscriber_id: Arc<AtomicU64>,
    subscriber_queue_capacity: usize,
}

impl FanoutPublisher {
    pub(super) fn new(
        logger: slog::Logger,
        sender: mpsc::UnboundedSender<FanoutEvent>,
        subscriber_queue_capacity: usize,
    ) -> Self {
        FanoutPublisher {
            logger,
            sender,
            next_subscriber_id: Arc::new(AtomicU64::new(1)),
            subscriber_queue_capacity,
        }
    }

    /// Hand a freshly committed transaction to every subscriber that is registered at this point
    /// of the queue.
    ///
    /// Must be called while the engine state lock is held, so that queue order matches commit
    /// order.
    pub(crate) fn deliver(&self, transaction: Transaction) {
        if self.sender.send(FanoutEvent::Deliver(transaction)).is_err() {
            slog::warn!(self.logger, "Fan-out task has exited. Transaction won't reach subscribers.");
        }
    }

    /// Creates a subscription whose replay is `history`. Every transaction delivered after this
    /// call will reach the new subscriber.
    ///
    /// Must be called while the engine state lock is held, and `history` must be the WAL as of
    /// that moment.
    pub(crate) fn register(&self, history: Vec<Transaction>) -> Subscription {
        let id = SubscriberId::new(self.next_subscriber_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel(self.subscriber_queue_capacity);
        let lag_flag = LagFlag::new();

        let register = FanoutEvent::Register {
            id,
            sender,
            lag_flag: lag_flag.clone(),
        };
        if self.sender.send(register).is_err() {
            // The receiver half is dropped along with the sender half inside the event, so the
            // subscription sees its history and then a closed stream.
            slog::warn!(self.logger, "Fan-out task has exited. Subscriber {:?} will only see history.", id);
        }

        Subscription::new(id, history, receiver, lag_flag, self.sender.clone())
    }
}
