use std::collections::BTreeMap;

/// SequenceTable remembers the highest transaction id applied for every source. Informally
/// this is the node's "vector clock", but it is only used to suppress duplicates. It says
/// nothing about causality across sources.
///
/// Values only ever move forward.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SequenceTable {
    highest_applied_ids: BTreeMap<String, u64>,
}

impl SequenceTable {
    pub(crate) fn new() -> Self {
        SequenceTable::default()
    }

    /// Returns true if a transaction with this `(source, id)` was already applied, or is
    /// older than one that was.
    pub(crate) fn is_applied(&self, source: &str, id: u64) -> bool {
        id <= self.highest_applied_id(source)
    }

    /// 0 means nothing from `source` has been applied. Real ids start from 1.
    pub(crate) fn highest_applied_id(&self, source: &str) -> u64 {
        self.highest_applied_ids.get(source).copied().unwrap_or(0)
    }

    /// Ratchets `source` forward to `id`. Callers must have checked `is_applied()` first.
    pub(crate) fn record_applied(&mut self, source: &str, id: u64) {
        let current = self.highest_applied_id(source);
        assert!(
            id > current,
            "Can't ratchet sequence table backwards for source {:?}. Expected [input] {} > {} [current]",
            source,
            id,
            current,
        );

        self.highest_applied_ids.insert(source.to_string(), id);
    }

    pub(crate) fn to_map(&self) -> BTreeMap<String, u64> {
        self.highest_applied_ids.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_source_has_nothing_applied() {
        let table = SequenceTable::new();

        assert_eq!(table.highest_applied_id("A"), 0);
        assert!(!table.is_applied("A", 1));
        // Id 0 is never a real id, so it is always treated as seen.
        assert!(table.is_applied("A", 0));
    }

    #[test]
    fn record_then_check() {
        let mut table = SequenceTable::new();
        table.record_applied("A", 3);
        table.record_applied("B", 1);

        assert!(table.is_applied("A", 1));
        assert!(table.is_applied("A", 3));
        assert!(!table.is_applied("A", 4));
        assert!(table.is_applied("B", 1));
        assert!(!table.is_applied("C", 1));

        let expected: BTreeMap<String, u64> = vec![("A".to_string(), 3), ("B".to_string(), 1)].into_iter().collect();
        assert_eq!(table.to_map(), expected);
    }

    #[test]
    fn gaps_are_allowed() {
        let mut table = SequenceTable::new();
        table.record_applied("A", 1);
        table.record_applied("A", 7);

        assert_eq!(table.highest_applied_id("A"), 7);
        // Anything below the high water mark is absorbed, even if it was never seen.
        assert!(table.is_applied("A", 5));
    }

    #[test]
    #[should_panic(expected = "Can't ratchet sequence table backwards")]
    fn record_backwards_panics() {
        let mut table = SequenceTable::new();
        table.record_applied("A", 2);
        table.record_applied("A", 2);
    }
}
