//! Chronological ordering of order records.
//!
//! Both sorts are stable: records sharing a timestamp keep the order in which
//! they were discovered on the ledger.

use crate::domain::TimeSec;

/// Anything positioned on the ledger clock.
pub trait Timestamped {
    fn timestamp(&self) -> TimeSec;
}

impl Timestamped for crate::domain::Order {
    fn timestamp(&self) -> TimeSec {
        self.timestamp
    }
}

/// Oldest first.
pub fn sort_ascending<T: Timestamped>(items: &mut [T]) {
    items.sort_by_key(|item| item.timestamp());
}

/// Newest first.
pub fn sort_descending<T: Timestamped>(items: &mut [T]) {
    items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}
