//! Prober registry: the map from host prober keys to records.
//!
//! Backed by a sharded [`DashMap`], so a producer looking up its record
//! only ever touches the one shard holding its key. Allocation and the
//! worker's end-of-pass discard lock a single shard for the duration of
//! one insert or remove.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use reach_core::ProberKey;

use crate::record::ProberRecord;

pub(crate) struct ProberRegistry<P> {
    records: DashMap<P, Arc<ProberRecord>>,
    /// Records displaced by a re-allocation while still `PendingDestroy`.
    /// The worker unwinds them on its next pass.
    retired: Mutex<Vec<Arc<ProberRecord>>>,
}

impl<P: ProberKey> ProberRegistry<P> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            retired: Mutex::new(Vec::new()),
        }
    }

    /// Register `prober`. Returns `true` if a new record was created.
    ///
    /// Idempotent for a live prober. A prober that was removed but not yet
    /// unwound gets a fresh record; the old one is retired for the worker.
    pub fn allocate(&self, prober: P) -> bool {
        if self.contains_live(&prober) {
            return false;
        }
        let displaced = match self.records.entry(prober) {
            Entry::Occupied(mut e) => {
                if e.get().is_live() {
                    return false;
                }
                e.insert(Arc::new(ProberRecord::new()))
            }
            Entry::Vacant(e) => {
                e.insert(Arc::new(ProberRecord::new()));
                return true;
            }
        };
        // Shard guard is released before the retired list is locked.
        self.retired.lock().push(displaced);
        true
    }

    pub fn get(&self, prober: &P) -> Option<Arc<ProberRecord>> {
        self.records.get(prober).map(|r| Arc::clone(r.value()))
    }

    /// Whether `prober` has a live (not removed) record.
    pub fn contains_live(&self, prober: &P) -> bool {
        self.records.get(prober).is_some_and(|r| r.is_live())
    }

    /// Every registered record. Order is unspecified.
    pub fn snapshot(&self) -> Vec<(P, Arc<ProberRecord>)> {
        self.records
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect()
    }

    pub fn take_retired(&self) -> Vec<Arc<ProberRecord>> {
        std::mem::take(&mut *self.retired.lock())
    }

    /// Drop `prober`'s entry if it still points at `record`.
    pub fn discard(&self, prober: &P, record: &Arc<ProberRecord>) -> bool {
        self.records
            .remove_if(prober, |_, r| Arc::ptr_eq(r, record))
            .is_some()
    }

    /// Number of registered records, including ones pending removal.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Number of probers whose record is live.
    pub fn live_len(&self) -> usize {
        self.records.iter().filter(|e| e.value().is_live()).count()
    }

    /// Drop every record. Returns how many were registered or retired.
    pub fn clear(&self) -> usize {
        let mut n = 0;
        self.records.retain(|_, record| {
            record.mark_removed();
            n += 1;
            false
        });
        let retired = self.take_retired();
        for record in &retired {
            record.mark_removed();
        }
        n + retired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Lifecycle;
    use reach_core::CellId;

    #[test]
    fn allocate_is_idempotent() {
        let reg = ProberRegistry::new();
        assert!(reg.allocate("a"));
        assert!(!reg.allocate("a"));
        assert_eq!(reg.len(), 1);
        assert!(reg.contains_live(&"a"));
        assert!(!reg.contains_live(&"b"));
    }

    #[test]
    fn reallocating_a_removed_prober_retires_the_old_record() {
        let reg = ProberRegistry::new();
        reg.allocate(1u32);
        let old = reg.get(&1).unwrap();
        old.mark_destroy();

        assert!(reg.allocate(1));
        let new = reg.get(&1).unwrap();
        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(new.lifecycle(), Lifecycle::Active);

        let retired = reg.take_retired();
        assert_eq!(retired.len(), 1);
        assert!(Arc::ptr_eq(&retired[0], &old));
        assert!(reg.take_retired().is_empty());
    }

    #[test]
    fn discard_only_removes_the_matching_record() {
        let reg = ProberRegistry::new();
        reg.allocate(7u64);
        let stale = Arc::new(ProberRecord::new());
        assert!(!reg.discard(&7, &stale));
        let current = reg.get(&7).unwrap();
        assert!(reg.discard(&7, &current));
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn snapshot_lists_every_record_once() {
        let reg = ProberRegistry::new();
        for p in [3u8, 1, 2] {
            reg.allocate(p);
        }
        let mut keys: Vec<u8> = reg.snapshot().into_iter().map(|(p, _)| p).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn producer_lookup_is_not_blocked_by_an_allocation_in_flight() {
        let reg = ProberRegistry::new();
        for p in 0..64u32 {
            reg.allocate(p);
        }
        // An allocation of a new prober holds its shard for the insert.
        let in_flight = reg.records.entry(1_000);
        let free = (0..64u32)
            .find(|p| reg.records.try_get(p).is_present())
            .expect("some prober lives in another shard");

        let record = reg.get(&free).unwrap();
        let merged = record.occupy(&[CellId(2), CellId(1)], true).unwrap();
        assert!(!merged.overlapped);
        drop(in_flight);

        assert_eq!(record.take_full_query(), Some(vec![CellId(1), CellId(2)]));

        assert!(reg.allocate(1_000));
        assert_eq!(reg.len(), 65);
    }

    #[test]
    fn clear_marks_everything_removed() {
        let reg = ProberRegistry::new();
        reg.allocate('x');
        let r = reg.get(&'x').unwrap();
        assert_eq!(reg.clear(), 1);
        assert_eq!(reg.len(), 0);
        assert_eq!(r.lifecycle(), Lifecycle::Removed);
    }
}
