use crate::engine::Transaction;
use crate::fanout::publisher::FanoutEvent;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// SubscriberId is unique per node for the lifetime of the process.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub(super) fn new(id: u64) -> Self {
        SubscriberId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a subscription stopped receiving live transactions before it was detached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The subscriber didn't drain its queue fast enough and was disconnected. Attaching again
    /// replays the full history, so nothing is lost for a subscriber that dedups.
    SubscriberLagged,
}

#[derive(Clone, Debug)]
pub(super) struct LagFlag(Arc<AtomicBool>);

impl LagFlag {
    pub(super) fn new() -> Self {
        LagFlag(Arc::new(AtomicBool::new(false)))
    }

    pub(super) fn mark_lagged(&self) {
        self.0.store(true, Ordering::Release);
    }

    fn is_lagged(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Subscription is one attached subscriber: the write-ahead log as of attach time, followed
/// by every transaction the engine applies afterwards, without gaps, duplicates or
/// reordering.
///
/// Dropping the subscription detaches it.
pub struct Subscription {
    id: SubscriberId,
    history: VecDeque<Transaction>,
    live: mpsc::Receiver<Transaction>,
    lag_flag: LagFlag,
    fanout: mpsc::UnboundedSender<FanoutEvent>,
}

impl Subscription {
    pub(super) fn new(
        id: SubscriberId,
        history: Vec<Transaction>,
        live: mpsc::Receiver<Transaction>,
        lag_flag: LagFlag,
        fanout: mpsc::UnboundedSender<FanoutEvent>,
    ) -> Self {
        Subscription {
            id,
            history: history.into(),
            live,
            lag_flag,
            fanout,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Number of history transactions that have not been handed out yet.
    pub fn pending_history_len(&self) -> usize {
        self.history.len()
    }

    /// Returns the next transaction. History comes first, then live transactions.
    ///
    /// `None` means the subscription will never yield again, either because it was
    /// disconnected (see `drop_reason()`) or because the node is shutting down.
    pub async fn next(&mut self) -> Option<Transaction> {
        if let Some(transaction) = self.history.pop_front() {
            return Some(transaction);
        }

        self.live.recv().await
    }

    /// Non-blocking `next()`. Returns `None` if nothing is available right now.
    pub fn try_next(&mut self) -> Option<Transaction> {
        if let Some(transaction) = self.history.pop_front() {
            return Some(transaction);
        }

        self.live.try_recv().ok()
    }

    pub fn drop_reason(&self) -> Option<DropReason> {
        if self.lag_flag.is_lagged() {
            Some(DropReason::SubscriberLagged)
        } else {
            None
        }
    }

    /// Detaches explicitly. Equivalent to dropping the subscription.
    pub fn detach(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Fan-out task may have already exited, in which case there's nothing to detach from.
        let _ = self.fanout.send(FanoutEvent::Unregister(self.id));
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("pending_history_len", &self.history.len())
            .field("drop_reason", &self.drop_reason())
            .finish()
    }
}
