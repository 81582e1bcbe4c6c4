use serde_json::Value;
use std::error::Error;

/// PatchStrategy is how the engine turns a transaction payload into the next document.
///
/// Implementations must be deterministic: every node runs the same strategy over the same
/// payloads, and convergence depends on them computing the same document.
///
/// The strategy gets its own copy of the current document and may edit it in place. The
/// returned document replaces the current one only on `Ok`. On `Err` the copy is thrown away,
/// so the current document stays as it was.
pub trait PatchStrategy: Send + 'static {
    fn apply(&self, document: Value, payload: &str) -> Result<Value, ApplyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// The payload could not be decoded as a patch at all.
    #[error("Malformed patch: {0}")]
    MalformedPatch(Box<dyn Error + Send + Sync>),

    /// The payload is a patch, but it can't be applied to the current document. For example,
    /// it references a path that doesn't exist.
    #[error("Patch can't be applied to current document: {0}")]
    PatchApplyConflict(Box<dyn Error + Send + Sync>),
}

/// JsonPatchStrategy applies RFC 6902 JSON Patch documents.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPatchStrategy;

impl PatchStrategy for JsonPatchStrategy {
    fn apply(&self, mut document: Value, payload: &str) -> Result<Value, ApplyError> {
        let patch: json_patch::Patch =
            serde_json::from_str(payload).map_err(|e| ApplyError::MalformedPatch(e.into()))?;

        json_patch::patch(&mut document, &patch.0).map_err(|e| ApplyError::PatchApplyConflict(e.into()))?;

        Ok(document)
    }
}
