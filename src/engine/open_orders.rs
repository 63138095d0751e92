//! Open-order set: placed minus filled minus cancelled, by id.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::domain::{EventKind, Order, OrderId};

/// Inconsistency between the three order streams.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IntegrityViolation {
    /// The id appears in both the Trade and the Cancel stream.
    FilledAndCancelled { id: OrderId },
    /// A Trade or Cancel names an id never placed.
    UnknownOrder { id: OrderId, stream: EventKind },
    /// The Order stream carries the id more than once.
    DuplicateOrder { id: OrderId },
}

/// Result of resolving the open set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenOrderSet {
    /// Open orders in discovery order.
    pub orders: Vec<Order>,
    /// Sorted, deduplicated violations.
    pub violations: Vec<IntegrityViolation>,
}

/// Compute the open set.
///
/// Filled and cancelled ids are indexed once, so this is linear in the
/// total number of records. An id that is both filled and cancelled never
/// appears in the output; for a duplicated id only the first placement counts.
pub fn compute_open_orders(all: &[Order], filled: &[Order], cancelled: &[Order]) -> OpenOrderSet {
    let filled_ids: HashSet<OrderId> = filled.iter().map(|o| o.id).collect();
    let cancelled_ids: HashSet<OrderId> = cancelled.iter().map(|o| o.id).collect();

    let mut violations = BTreeSet::new();
    let mut placed: HashSet<OrderId> = HashSet::with_capacity(all.len());
    let mut orders = Vec::new();

    for order in all {
        if !placed.insert(order.id) {
            violations.insert(IntegrityViolation::DuplicateOrder { id: order.id });
            continue;
        }
        if filled_ids.contains(&order.id) || cancelled_ids.contains(&order.id) {
            continue;
        }
        orders.push(order.clone());
    }

    for id in filled_ids.intersection(&cancelled_ids) {
        violations.insert(IntegrityViolation::FilledAndCancelled { id: *id });
    }
    for (stream, ids) in [(EventKind::Trade, &filled_ids), (EventKind::Cancel, &cancelled_ids)] {
        for id in ids.iter().filter(|id| !placed.contains(*id)) {
            violations.insert(IntegrityViolation::UnknownOrder { id: *id, stream });
        }
    }

    OpenOrderSet {
        orders,
        violations: violations.into_iter().collect(),
    }
}
