//! Capability switches and fault injection
//!
//! [`Capabilities`] decides which optional operations the repository admits;
//! a declined operation answers `Unsupported` before touching any data.
//! [`FaultPlan`] makes an otherwise correct repository misbehave: slow calls,
//! genuine errors, and consistency violations a conformance run must catch.

use conform_core::{ConnectorError, ConnectorResult, Guid, Operation};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::thread;
use std::time::Duration;

/// Optional operations the repository admits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    declined: HashSet<Operation>,
    as_of_declined: bool,
}

impl Capabilities {
    /// Every operation supported, including as-of reads
    pub fn full() -> Self {
        Self::default()
    }

    /// Same capabilities with `operation` declined
    pub fn without(mut self, operation: Operation) -> Self {
        self.declined.insert(operation);
        self
    }

    /// Same capabilities with as-of reads declined
    pub fn without_as_of(mut self) -> Self {
        self.as_of_declined = true;
        self
    }

    /// True if `operation` is admitted
    pub fn supports(&self, operation: Operation) -> bool {
        !self.declined.contains(&operation)
    }

    /// True if reads at a past point in time are admitted
    pub fn supports_as_of(&self) -> bool {
        !self.as_of_declined
    }

    /// Admit or decline a call of `operation`, as of a time if given
    pub fn check(&self, operation: Operation, as_of_time: bool) -> ConnectorResult<()> {
        if !self.supports(operation) || (as_of_time && !self.supports_as_of()) {
            return Err(ConnectorError::unsupported(operation));
        }
        Ok(())
    }
}

/// One way for the repository to misbehave
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// Detail reads of this instance report it absent
    HideDetail(Guid),
    /// Calls of `operation` fail with `error`, for one instance or all
    Fail {
        /// Affected operation
        operation: Operation,
        /// Affected instance; `None` means every call
        guid: Option<Guid>,
        /// Error returned
        error: ConnectorError,
    },
    /// Calls of `operation` sleep before answering
    Delay {
        /// Affected operation
        operation: Operation,
        /// Added latency
        delay: Duration,
    },
    /// Searches return every hit twice (still within the limit)
    DuplicateSearchResults,
    /// History of this instance comes back oldest first
    ForwardHistory(Guid),
}

/// Injected faults, consulted on every contract call
#[derive(Debug, Default)]
pub struct FaultPlan {
    faults: RwLock<Vec<Fault>>,
}

impl FaultPlan {
    /// Plan with no faults
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fault
    pub fn inject(&self, fault: Fault) {
        self.faults.write().push(fault);
    }

    /// Remove every fault
    pub fn clear(&self) {
        self.faults.write().clear();
    }

    /// True if no fault is injected
    pub fn is_empty(&self) -> bool {
        self.faults.read().is_empty()
    }

    /// Apply delays and failures for a call of `operation` on `guid`
    pub fn before_call(&self, operation: Operation, guid: Option<&Guid>) -> ConnectorResult<()> {
        // Copy out what applies so no lock is held while sleeping.
        let mut delay = Duration::ZERO;
        let mut failure = None;
        for fault in self.faults.read().iter() {
            match fault {
                Fault::Delay { operation: op, delay: d } if *op == operation => delay += *d,
                Fault::Fail {
                    operation: op,
                    guid: target,
                    error,
                } if *op == operation && failure.is_none() => {
                    if target.is_none() || target.as_ref() == guid {
                        failure = Some(error.clone());
                    }
                }
                _ => {}
            }
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// True if detail reads of `guid` must report it absent
    pub fn hides_detail(&self, guid: &Guid) -> bool {
        self.faults
            .read()
            .iter()
            .any(|f| matches!(f, Fault::HideDetail(g) if g == guid))
    }

    /// True if searches duplicate their hits
    pub fn duplicates_search_results(&self) -> bool {
        self.faults
            .read()
            .iter()
            .any(|f| matches!(f, Fault::DuplicateSearchResults))
    }

    /// True if the history of `guid` must come back oldest first
    pub fn forwards_history(&self, guid: &Guid) -> bool {
        self.faults
            .read()
            .iter()
            .any(|f| matches!(f, Fault::ForwardHistory(g) if g == guid))
    }
}
