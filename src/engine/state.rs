use crate::engine::sequence_table::SequenceTable;
use crate::engine::Transaction;
use crate::fanout::{FanoutPublisher, Subscription};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

struct EngineState {
    // Current document. Always equal to replaying `wal` from an empty object.
    document: Value,
    // Every accepted transaction, in the order it was applied.
    wal: Vec<Transaction>,
    sequence_table: SequenceTable,
}

/// SharedEngineState is the document, write-ahead log and sequence table, behind one lock.
///
/// There is only ever one writer (the apply engine task), which calls `commit()`. Everything
/// else only reads. Attaching a subscriber is a read too, but it is mutually exclusive with
/// `commit()`, which is what gives the subscriber a well defined history boundary.
#[derive(Clone)]
pub(crate) struct SharedEngineState {
    inner: Arc<RwLock<EngineState>>,
    fanout: FanoutPublisher,
}

impl SharedEngineState {
    pub(crate) fn new(fanout: FanoutPublisher) -> Self {
        let state = EngineState {
            document: Value::Object(Map::new()),
            wal: Vec::new(),
            sequence_table: SequenceTable::new(),
        };

        SharedEngineState {
            inner: Arc::new(RwLock::new(state)),
            fanout,
        }
    }

    pub(crate) fn is_applied(&self, transaction: &Transaction) -> bool {
        self.inner
            .read()
            .sequence_table
            .is_applied(&transaction.source, transaction.id)
    }

    /// Replace the document with `new_document`, which is the result of applying
    /// `transaction` to the current document, then hand the transaction to the fan-out task.
    pub(crate) fn commit(&self, new_document: Value, transaction: Transaction) {
        let mut state = self.inner.write();

        state.document = new_document;
        state
            .sequence_table
            .record_applied(&transaction.source, transaction.id);
        state.wal.push(transaction.clone());

        // Still under the lock. Queue order to the fan-out task must match WAL order.
        self.fanout.deliver(transaction);
    }

    /// Attach a new subscriber. Its history is the WAL as of now, and it will receive every
    /// transaction committed afterwards.
    pub(crate) fn attach(&self) -> Subscription {
        let state = self.inner.read();

        self.fanout.register(state.wal.clone())
    }

    pub(crate) fn read_document(&self) -> Value {
        self.inner.read().document.clone()
    }

    pub(crate) fn read_sequence_table(&self) -> BTreeMap<String, u64> {
        self.inner.read().sequence_table.to_map()
    }

    pub(crate) fn wal_len(&self) -> usize {
        self.inner.read().wal.len()
    }

    #[cfg(test)]
    pub(crate) fn read_wal(&self) -> Vec<Transaction> {
        self.inner.read().wal.clone()
    }
}
