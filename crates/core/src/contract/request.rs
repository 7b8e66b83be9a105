//! Search and history request parameters

use super::{Guid, Timestamp};
use serde::{Deserialize, Serialize};

/// Ordering of a history sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    /// Oldest version first
    Forwards,
    /// Most recent version first
    Backwards,
}

/// Parameters of a `find_*` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindRequest {
    /// Type whose instances are wanted
    pub type_guid: Guid,
    /// Historical point in time; `None` means current state
    pub as_of_time: Option<Timestamp>,
    /// Upper bound on returned instances
    pub limit: usize,
}

impl FindRequest {
    /// Current-state search for up to `limit` instances of a type
    pub fn of_type(type_guid: Guid, limit: usize) -> Self {
        FindRequest {
            type_guid,
            as_of_time: None,
            limit,
        }
    }

    /// Same search against the state as of `as_of`
    pub fn as_of(mut self, as_of: Timestamp) -> Self {
        self.as_of_time = Some(as_of);
        self
    }
}

/// Parameters of a `get_*_history` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Earliest version time of interest; `None` means from creation
    pub from_time: Option<Timestamp>,
    /// Latest version time of interest; `None` means now
    pub to_time: Option<Timestamp>,
    /// Offset of the first element of the page
    pub start_from: usize,
    /// Maximum elements in the page
    pub page_size: usize,
    /// Sequence ordering
    pub order: HistoryOrder,
}

impl HistoryRequest {
    /// First page of the full history, most recent version first
    pub fn full(page_size: usize) -> Self {
        HistoryRequest {
            from_time: None,
            to_time: None,
            start_from: 0,
            page_size,
            order: HistoryOrder::Backwards,
        }
    }

    /// True when `at` falls inside the requested window
    pub fn covers(&self, at: Timestamp) -> bool {
        let after_start = self.from_time.map_or(true, |from| !at.is_before(from));
        let before_end = self.to_time.map_or(true, |to| !at.is_after(to));
        after_start && before_end
    }
}
