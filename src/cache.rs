//! Computed-artifact cache
//!
//! Multiple diagnostics sharing one analysis run should not re-parse the
//! trace or the network records. Entries are keyed by an artifact kind plus
//! a stable trace identity (SHA-256 of the raw input bytes), so idempotent
//! collaborators can be fetched-or-computed once per trace.
//!
//! The selection/attribution core never touches this cache; only the
//! pipeline layer does.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// Stable identity of one raw input, derived from its bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId([u8; 32]);

impl TraceId {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(digest.into())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Cache key: which computed artifact, for which input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub kind: &'static str,
    pub trace: TraceId,
}

impl ArtifactKey {
    pub fn new(kind: &'static str, trace: TraceId) -> Self {
        Self { kind, trace }
    }
}

/// Keyed cache of computed artifacts
#[derive(Debug, Default)]
pub struct ArtifactCache<V> {
    entries: HashMap<ArtifactKey, V>,
}

impl<V> ArtifactCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &ArtifactKey) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn put(&mut self, key: ArtifactKey, value: V) {
        self.entries.insert(key, value);
    }

    /// Return the cached artifact, computing and storing it on a miss
    ///
    /// A failed compute leaves the cache unchanged, so a later call retries.
    pub fn get_or_insert_with<E>(
        &mut self,
        key: ArtifactKey,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<&V, E> {
        use std::collections::hash_map::Entry;
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                tracing::debug!(kind = key.kind, trace = %key.trace, "artifact cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => Ok(entry.insert(compute()?)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
