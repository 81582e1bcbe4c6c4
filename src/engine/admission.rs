use crate::engine::intake::{IntakeClient, SubmitError};
use crate::engine::Transaction;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// LocalAdmission turns a locally written patch into a transaction from this node's source.
///
/// Ids are handed out 1, 2, 3, ... and reach the intake queue in that same order. Two
/// concurrent writers could otherwise enqueue id 2 ahead of id 1, at which point id 1 would be
/// discarded as already applied.
pub(crate) struct LocalAdmission {
    source: String,
    last_issued_id: AtomicU64,
    enqueue_order: Mutex<()>,
    intake: IntakeClient,
}

impl LocalAdmission {
    pub(crate) fn new(source: String, intake: IntakeClient) -> Self {
        LocalAdmission {
            source,
            last_issued_id: AtomicU64::new(0),
            enqueue_order: Mutex::new(()),
            intake,
        }
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    /// Returns once the transaction is in the intake queue, not once it has been applied. An
    /// invalid patch is only detected, and dropped, by the apply engine.
    pub(crate) async fn write(&self, payload: String) -> Result<u64, SubmitError> {
        let _guard = self.enqueue_order.lock().await;

        let id = self.next_id();
        self.intake
            .submit(Transaction::new(payload, self.source.as_str(), id))
            .await?;

        Ok(id)
    }

    fn next_id(&self) -> u64 {
        self.last_issued_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::intake;
    use std::sync::Arc;

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let (client, mut receiver) = intake::create(10);
        let admission = LocalAdmission::new("A".to_string(), client);

        assert_eq!(admission.write("[]".to_string()).await.unwrap(), 1);
        assert_eq!(admission.write("[]".to_string()).await.unwrap(), 2);

        let first = receiver.recv().await.unwrap();
        let second = receiver.recv().await.unwrap();
        assert_eq!((first.source.as_str(), first.id), ("A", 1));
        assert_eq!((second.source.as_str(), second.id), ("A", 2));
    }

    #[tokio::test]
    async fn concurrent_writers_enqueue_in_id_order() {
        let (client, mut receiver) = intake::create(4);
        let admission = Arc::new(LocalAdmission::new("A".to_string(), client));

        let writers: Vec<_> = (0..8)
            .map(|_| {
                let admission = admission.clone();
                tokio::spawn(async move {
                    for _ in 0..25 {
                        admission.write("[]".to_string()).await.unwrap();
                    }
                })
            })
            .collect();

        let mut ids = Vec::new();
        for _ in 0..200 {
            ids.push(receiver.recv().await.unwrap().id);
        }
        for writer in writers {
            writer.await.unwrap();
        }

        let expected: Vec<u64> = (1..=200).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn write_fails_once_engine_is_gone() {
        let (client, receiver) = intake::create(1);
        let admission = LocalAdmission::new("A".to_string(), client);
        drop(receiver);

        let result = admission.write("[]".to_string()).await;

        assert!(matches!(result, Err(SubmitError::EngineExited)));
    }
}
