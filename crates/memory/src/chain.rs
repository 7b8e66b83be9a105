//! Per-instance version chains
//!
//! Every write to an instance pushes a complete snapshot onto the front of its
//! chain, so the newest version is always first. As-of reads scan from the
//! front for the first version written at or before the requested time.

use conform_core::{HistoryOrder, HistoryRequest, InstanceSnapshot, InstanceStatus, Timestamp};
use std::collections::VecDeque;

/// All versions of one instance, newest first
#[derive(Debug, Clone)]
pub struct VersionChain {
    /// VecDeque gives O(1) push_front for new versions
    versions: VecDeque<InstanceSnapshot>,
}

impl VersionChain {
    /// Create a chain holding the first version of an instance
    pub fn new(first: InstanceSnapshot) -> Self {
        let mut versions = VecDeque::with_capacity(4);
        versions.push_front(first);
        Self { versions }
    }

    /// Add a new version (must be newer than every existing version)
    #[inline]
    pub fn push(&mut self, snapshot: InstanceSnapshot) {
        debug_assert!(
            self.latest().map_or(true, |l| l.version < snapshot.version),
            "versions must be pushed in increasing order"
        );
        self.versions.push_front(snapshot);
    }

    /// Most recent version
    pub fn latest(&self) -> Option<&InstanceSnapshot> {
        self.versions.front()
    }

    /// Version in effect at `as_of`, `None` if the instance did not exist yet
    pub fn at(&self, as_of: Timestamp) -> Option<&InstanceSnapshot> {
        self.versions.iter().find(|v| !v.update_time.is_after(as_of))
    }

    /// Version in effect at `as_of`, or the latest one
    pub fn resolve(&self, as_of: Option<Timestamp>) -> Option<&InstanceSnapshot> {
        match as_of {
            Some(as_of) => self.at(as_of),
            None => self.latest(),
        }
    }

    /// True if the latest version is a deletion
    pub fn is_deleted(&self) -> bool {
        self.latest()
            .map_or(false, |l| l.status == InstanceStatus::Deleted)
    }

    /// One page of the versions written within the request's time window
    pub fn history(&self, request: &HistoryRequest) -> Vec<InstanceSnapshot> {
        let mut in_window: Vec<&InstanceSnapshot> = self
            .versions
            .iter()
            .filter(|v| request.covers(v.update_time))
            .collect();
        if request.order == HistoryOrder::Forwards {
            in_window.reverse();
        }
        in_window
            .into_iter()
            .skip(request.start_from)
            .take(request.page_size)
            .cloned()
            .collect()
    }

    /// Number of versions
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Always false: a chain is created with its first version
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
