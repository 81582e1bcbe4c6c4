use crate::engine::patch::{ApplyError, PatchStrategy};
use crate::engine::state::SharedEngineState;
use crate::engine::Transaction;
use tokio::sync::mpsc;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ApplyOutcome {
    Applied,
    // `(source, id)` was already applied, or is older than something that was.
    Duplicate,
}

/// ApplyEngine is the single writer of the document. It pulls one transaction at a time off
/// the intake queue and applies it. Because nothing else ever mutates the state, the WAL,
/// document and sequence table never need to be reconciled between writers.
pub(crate) struct ApplyEngine<P: PatchStrategy> {
    logger: slog::Logger,
    receiver: mpsc::Receiver<Transaction>,
    state: SharedEngineState,
    patch_strategy: P,
}

impl<P: PatchStrategy> ApplyEngine<P> {
    pub(super) fn new(
        logger: slog::Logger,
        receiver: mpsc::Receiver<Transaction>,
        state: SharedEngineState,
        patch_strategy: P,
    ) -> Self {
        ApplyEngine {
            logger,
            receiver,
            state,
            patch_strategy,
        }
    }

    /// Runs until every `IntakeClient` has been dropped. A bad transaction never stops the loop.
    pub(crate) async fn run(mut self) {
        while let Some(transaction) = self.receiver.recv().await {
            self.handle_transaction(transaction);
        }

        slog::info!(self.logger, "Apply engine has exited.");
    }

    fn handle_transaction(&mut self, transaction: Transaction) {
        let source = transaction.source.clone();
        let id = transaction.id;

        match self.apply(transaction) {
            Ok(ApplyOutcome::Applied) => {
                slog::debug!(self.logger, "Applied transaction {}/{}", source, id);
            }
            Ok(ApplyOutcome::Duplicate) => {
                slog::debug!(self.logger, "Ignoring already applied transaction {}/{}", source, id);
            }
            Err(e) => {
                // The transaction is gone for good. Its origin is not told; it'd have nothing
                // useful to do with the information anyway.
                slog::warn!(self.logger, "Dropping transaction {}/{}: {}", source, id, e);
            }
        }
    }

    pub(crate) fn apply(&mut self, transaction: Transaction) -> Result<ApplyOutcome, ApplyError> {
        if self.state.is_applied(&transaction) {
            return Ok(ApplyOutcome::Duplicate);
        }

        // We are the only writer, so the document can't change between this read and the commit.
        // The strategy patches this one copy in place.
        let new_document = self
            .patch_strategy
            .apply(self.state.read_document(), &transaction.payload)?;

        self.state.commit(new_document, transaction);

        Ok(ApplyOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{self, EngineParts, JsonPatchStrategy};
    use crate::test_utils::{recv_with_sanity_timeout, test_logger};
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    type Parts = EngineParts<JsonPatchStrategy>;

    fn new_engine() -> Parts {
        engine::wired(test_logger(), JsonPatchStrategy, 30, 1024)
    }

    fn add_op(path: &str, value: Value) -> String {
        json!([{"op": "add", "path": path, "value": value}]).to_string()
    }

    fn txn(source: &str, id: u64, payload: String) -> Transaction {
        Transaction::new(payload, source, id)
    }

    fn table(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries.iter().map(|(s, id)| (s.to_string(), *id)).collect()
    }

    #[test]
    fn scenario_a_first_transaction_is_applied() {
        let mut parts = new_engine();
        assert_eq!(parts.state.read_document(), json!({}));

        let outcome = parts.apply_engine.apply(txn("A", 1, add_op("/x", json!(1)))).unwrap();

        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(parts.state.read_document(), json!({"x": 1}));
        assert_eq!(parts.state.read_sequence_table(), table(&[("A", 1)]));
        assert_eq!(parts.state.wal_len(), 1);
    }

    #[test]
    fn scenario_b_resubmitted_transaction_is_a_no_op() {
        let mut parts = new_engine();
        let t = txn("A", 1, add_op("/x", json!(1)));
        parts.apply_engine.apply(t.clone()).unwrap();

        let outcome = parts.apply_engine.apply(t).unwrap();

        assert_eq!(outcome, ApplyOutcome::Duplicate);
        assert_eq!(parts.state.read_document(), json!({"x": 1}));
        assert_eq!(parts.state.read_sequence_table(), table(&[("A", 1)]));
        assert_eq!(parts.state.wal_len(), 1);
    }

    #[test]
    fn idempotence_holds_even_with_different_payload() {
        let mut parts = new_engine();
        parts.apply_engine.apply(txn("A", 1, add_op("/x", json!(1)))).unwrap();

        // Same (source, id) means same transaction, regardless of what the payload says.
        let outcome = parts.apply_engine.apply(txn("A", 1, add_op("/x", json!(2)))).unwrap();

        assert_eq!(outcome, ApplyOutcome::Duplicate);
        assert_eq!(parts.state.read_document(), json!({"x": 1}));
    }

    #[test]
    fn monotonicity_older_ids_are_absorbed() {
        let mut parts = new_engine();
        parts.apply_engine.apply(txn("A", 5, add_op("/a", json!(5)))).unwrap();
        parts.apply_engine.apply(txn("B", 1, add_op("/b", json!(1)))).unwrap();

        let outcome = parts.apply_engine.apply(txn("A", 3, add_op("/c", json!(3)))).unwrap();

        assert_eq!(outcome, ApplyOutcome::Duplicate);
        assert_eq!(parts.state.read_sequence_table(), table(&[("A", 5), ("B", 1)]));
        assert_eq!(parts.state.read_document(), json!({"a": 5, "b": 1}));
    }

    #[test]
    fn scenario_e_malformed_patch_is_dropped() {
        let mut parts = new_engine();
        parts.apply_engine.apply(txn("A", 1, add_op("/x", json!(1)))).unwrap();

        let result = parts.apply_engine.apply(txn("A", 2, "{not a patch".to_string()));

        assert!(matches!(result, Err(ApplyError::MalformedPatch(_))));
        assert_eq!(parts.state.read_document(), json!({"x": 1}));
        assert_eq!(parts.state.read_sequence_table(), table(&[("A", 1)]));
        assert_eq!(parts.state.wal_len(), 1);
    }

    #[test]
    fn conflicting_patch_is_dropped_and_same_id_can_retry() {
        let mut parts = new_engine();
        let conflicting = json!([{"op": "replace", "path": "/missing", "value": 1}]).to_string();

        let result = parts.apply_engine.apply(txn("A", 1, conflicting));

        assert!(matches!(result, Err(ApplyError::PatchApplyConflict(_))));
        assert_eq!(parts.state.read_document(), json!({}));
        assert_eq!(parts.state.read_sequence_table(), table(&[]));

        // The dropped transaction did not consume the id.
        let outcome = parts.apply_engine.apply(txn("A", 1, add_op("/x", json!(1)))).unwrap();
        assert_eq!(outcome, ApplyOutcome::Applied);
    }

    /// Edits its copy, then fails.
    struct ScribbleThenFail;

    impl PatchStrategy for ScribbleThenFail {
        fn apply(&self, mut document: Value, _payload: &str) -> Result<Value, ApplyError> {
            document["scribbled"] = json!(true);
            Err(ApplyError::PatchApplyConflict("always fails".into()))
        }
    }

    #[test]
    fn strategy_edits_on_failed_apply_are_discarded() {
        let mut parts = engine::wired(test_logger(), ScribbleThenFail, 30, 1024);

        let result = parts.apply_engine.apply(txn("A", 1, add_op("/x", json!(1))));

        assert!(matches!(result, Err(ApplyError::PatchApplyConflict(_))));
        assert_eq!(parts.state.read_document(), json!({}));
        assert_eq!(parts.state.wal_len(), 0);
    }

    #[test]
    fn snapshot_equals_replay_of_wal() {
        let mut parts = new_engine();
        parts.apply_engine.apply(txn("A", 1, add_op("/list", json!([])))).unwrap();
        parts.apply_engine.apply(txn("B", 1, add_op("/list/-", json!("b1")))).unwrap();
        parts.apply_engine.apply(txn("A", 2, add_op("/list/-", json!("a2")))).unwrap();
        let _ = parts.apply_engine.apply(txn("B", 2, "garbage".to_string()));
        parts.apply_engine.apply(txn("B", 3, add_op("/n", json!(3)))).unwrap();

        let mut replayed = json!({});
        for t in parts.state.read_wal() {
            replayed = JsonPatchStrategy.apply(replayed, &t.payload).unwrap();
        }

        assert_eq!(replayed, parts.state.read_document());
        assert_eq!(replayed, json!({"list": ["b1", "a2"], "n": 3}));
    }

    #[test]
    fn convergence_same_order_same_bytes() {
        let transactions = vec![
            txn("A", 1, add_op("/doc", json!({}))),
            txn("B", 1, add_op("/doc/zeta", json!(1))),
            txn("A", 2, add_op("/doc/alpha", json!([1, 2]))),
            txn("C", 7, add_op("/doc/mid", json!({"k": "v"}))),
        ];

        let mut left = new_engine();
        let mut right = new_engine();
        for t in transactions.iter().cloned() {
            left.apply_engine.apply(t).unwrap();
        }
        for t in transactions.into_iter() {
            right.apply_engine.apply(t.clone()).unwrap();
            // Duplicates along the way change nothing.
            right.apply_engine.apply(t).unwrap();
        }

        let left_bytes = left.state.read_document().to_string();
        let right_bytes = right.state.read_document().to_string();
        assert_eq!(left_bytes, right_bytes);
        assert_eq!(left.state.read_sequence_table(), right.state.read_sequence_table());
    }

    #[tokio::test]
    async fn scenario_c_history_then_live() {
        let mut parts = new_engine();
        tokio::spawn(parts.fanout_task.run());

        let t1 = txn("A", 1, add_op("/a", json!(1)));
        let t2 = txn("A", 2, add_op("/b", json!(2)));
        let t3 = txn("B", 1, add_op("/c", json!(3)));
        parts.apply_engine.apply(t1.clone()).unwrap();
        parts.apply_engine.apply(t2.clone()).unwrap();

        let mut subscription = parts.state.attach();
        assert_eq!(subscription.pending_history_len(), 2);

        parts.apply_engine.apply(t3.clone()).unwrap();

        assert_eq!(subscription.next().await, Some(t1));
        assert_eq!(subscription.next().await, Some(t2));
        assert_eq!(recv_with_sanity_timeout(subscription.next()).await, Some(t3));
        assert_eq!(subscription.try_next(), None);
    }

    #[tokio::test]
    async fn ordering_across_concurrent_attach_and_apply() {
        let parts = new_engine();
        let EngineParts {
            apply_engine,
            fanout_task,
            intake,
            state,
        } = parts;
        tokio::spawn(fanout_task.run());
        tokio::spawn(apply_engine.run());

        let total = 200u64;
        let writer = {
            let intake = intake.clone();
            tokio::spawn(async move {
                for id in 1..=total {
                    let payload = add_op(&format!("/k{}", id), json!(id));
                    intake.submit(txn("A", id, payload)).await.unwrap();
                }
            })
        };

        // Attach at some arbitrary point while transactions are flowing.
        tokio::task::yield_now().await;
        let mut subscription = state.attach();

        let mut received = Vec::new();
        for _ in 0..total {
            let t = recv_with_sanity_timeout(subscription.next())
                .await
                .expect("subscription closed early");
            received.push(t.id);
        }
        writer.await.unwrap();

        let expected: Vec<u64> = (1..=total).collect();
        assert_eq!(received, expected);
    }

    #[tokio::test]
    async fn run_loop_survives_bad_transactions() {
        let EngineParts {
            apply_engine,
            fanout_task,
            intake,
            state,
        } = new_engine();
        tokio::spawn(fanout_task.run());
        let engine_task = tokio::spawn(apply_engine.run());
        let mut subscription = state.attach();

        intake.submit(txn("A", 1, "][".to_string())).await.unwrap();
        intake
            .submit(txn("A", 2, json!([{"op": "remove", "path": "/nope"}]).to_string()))
            .await
            .unwrap();
        intake.submit(txn("A", 3, add_op("/ok", json!(true)))).await.unwrap();

        let applied = recv_with_sanity_timeout(subscription.next()).await.unwrap();
        assert_eq!(applied.id, 3);
        assert_eq!(state.read_document(), json!({"ok": true}));

        // Dropping the last intake client lets the engine exit cleanly.
        drop(intake);
        engine_task.await.unwrap();
    }
}
