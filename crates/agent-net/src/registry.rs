//! Agent Registry (C6): `kvm_id -> handle` map.
//!
//! Entries are created externally by the connection acceptor (out of
//! scope for this core, per spec.md §1) and removed only by a reader's
//! disconnect path. A single mutex is enough: the critical section is
//! always a single map operation, never held across I/O.

use std::{collections::HashMap, sync::Mutex};

/// `H` is an opaque handle type owned by the embedding application —
/// spec.md §3 names only the map shape, not what an entry carries.
pub struct AgentRegistry<H> {
    entries: Mutex<HashMap<String, H>>,
}

impl<H> Default for AgentRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> AgentRegistry<H> {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }

    pub fn insert(&self, kvm_id: String, handle: H) {
        let mut entries = self.entries.lock().unwrap_or_else(|poison| poison.into_inner());
        entries.insert(kvm_id, handle);
    }

    /// Removed by the reader's disconnect path; spec.md property 7 requires
    /// the kvm to be absent the moment the reader returns, so this must be
    /// called synchronously from that path, not deferred.
    pub fn remove(&self, kvm_id: &str) -> Option<H> {
        let mut entries = self.entries.lock().unwrap_or_else(|poison| poison.into_inner());
        entries.remove(kvm_id)
    }

    pub fn contains(&self, kvm_id: &str) -> bool {
        let entries = self.entries.lock().unwrap_or_else(|poison| poison.into_inner());
        entries.contains_key(kvm_id)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|poison| poison.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_on_disconnect_is_visible_immediately() {
        let registry: AgentRegistry<()> = AgentRegistry::new();
        registry.insert("kvm-1".into(), ());
        assert!(registry.contains("kvm-1"));

        registry.remove("kvm-1");
        assert!(!registry.contains("kvm-1"));
    }
}
