use std::fmt;

/// Transaction is one patch as it travels between nodes. It is created once, either by local
/// admission or by a peer, and is never mutated afterwards.
///
/// `(source, id)` identifies a transaction across the whole cluster. Ids are strictly
/// increasing per source, which is what lets every node discard re-deliveries.
///
/// The payload is text, same as on the wire, so it reaches every peer byte for byte.
#[derive(Clone, PartialEq, Eq)]
pub struct Transaction {
    pub payload: String,
    pub source: String,
    pub id: u64,
}

impl Transaction {
    pub fn new(payload: impl Into<String>, source: impl Into<String>, id: u64) -> Self {
        Transaction {
            payload: payload.into(),
            source: source.into(),
            id,
        }
    }
}

// Payloads can be large. Only show a prefix of them in logs.
const DEBUG_PAYLOAD_PREFIX_CHARS: usize = 64;

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload: String = self.payload.chars().take(DEBUG_PAYLOAD_PREFIX_CHARS).collect();

        f.debug_struct("Transaction")
            .field("source", &self.source)
            .field("id", &self.id)
            .field("payload", &payload)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_truncates_long_payload_on_char_boundary() {
        let payload = "é".repeat(100);
        let transaction = Transaction::new(payload, "A", 1);

        let debug = format!("{:?}", transaction);

        assert!(debug.contains(&"é".repeat(64)));
        assert!(!debug.contains(&"é".repeat(65)));
        assert!(debug.contains("payload_len: 200"));
    }
}
