use crate::engine::Transaction;
use tokio::sync::mpsc;

pub(super) fn create(buffer_size: usize) -> (IntakeClient, mpsc::Receiver<Transaction>) {
    let (tx, rx) = mpsc::channel(buffer_size);

    (IntakeClient { sender: tx }, rx)
}

/// IntakeClient feeds the apply engine. Local admission and every peer stream share the same
/// bounded queue.
#[derive(Clone)]
pub(crate) struct IntakeClient {
    sender: mpsc::Sender<Transaction>,
}

impl IntakeClient {
    /// Waits while the intake queue is full. That is the only backpressure in the engine, and
    /// there is intentionally no timeout.
    pub(crate) async fn submit(&self, transaction: Transaction) -> Result<(), SubmitError> {
        self.sender
            .send(transaction)
            .await
            .map_err(|_| SubmitError::EngineExited)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    // Engine logic runs on a background task. This error is returned if the task has exited.
    #[error("Apply engine task has exited")]
    EngineExited,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::recv_with_sanity_timeout;
    use tokio::time::Duration;

    #[tokio::test]
    async fn submit_waits_while_queue_is_full() {
        let (client, mut receiver) = create(1);
        client.submit(Transaction::new("[]", "A", 1)).await.unwrap();

        let mut second = {
            let client = client.clone();
            tokio::spawn(async move { client.submit(Transaction::new("[]", "A", 2)).await })
        };

        let still_waiting = tokio::time::timeout(Duration::from_millis(50), &mut second).await;
        assert!(still_waiting.is_err());

        assert_eq!(receiver.recv().await.unwrap().id, 1);
        recv_with_sanity_timeout(second).await.unwrap().unwrap();
        assert_eq!(receiver.recv().await.unwrap().id, 2);
    }

    #[tokio::test]
    async fn submit_fails_once_engine_is_gone() {
        let (client, receiver) = create(1);
        drop(receiver);

        let result = client.submit(Transaction::new("[]", "A", 1)).await;

        assert!(matches!(result, Err(SubmitError::EngineExited)));
    }
}
