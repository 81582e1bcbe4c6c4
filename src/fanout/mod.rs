//! Replica registry and fan-out. Tracks attached subscribers and copies every committed
//! transaction to each of them.

mod fanout_task;
mod publisher;
mod subscription;

pub use subscription::DropReason;
pub use subscription::SubscriberId;
pub use subscription::Subscription;

pub(crate) use fanout_task::FanoutTask;
pub(crate) use publisher::FanoutPublisher;

use tokio::sync::mpsc;

pub(crate) fn wired(logger: slog::Logger, subscriber_queue_capacity: usize) -> (FanoutPublisher, FanoutTask) {
    let (tx, rx) = mpsc::unbounded_channel();

    let publisher = FanoutPublisher::new(logger.clone(), tx, subscriber_queue_capacity);
    let task = FanoutTask::new(logger, rx);

    (publisher, task)
}
