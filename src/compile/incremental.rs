//! Recompute of derived views, memoized on the collection version.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::domain::Order;
use crate::engine::{
    build_order_book, build_price_chart, build_trade_history, compute_open_orders,
    DecoratedOrder, OpenOrderSet, OrderBook, PriceChart,
};
use crate::store::{EventStore, StreamStatuses};

use super::ViewVersion;

/// Every view derived from the order streams at one version.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedViews {
    pub version: ViewVersion,
    pub open_orders: OpenOrderSet,
    pub order_book: OrderBook,
    /// Newest first.
    pub trade_history: Vec<DecoratedOrder>,
    pub price_chart: PriceChart,
    /// Raw trades, for the per-account views.
    pub filled: Vec<Order>,
}

/// Run the full pipeline over the given collections.
pub fn compile_views(
    version: ViewVersion,
    all: &[Order],
    filled: &[Order],
    cancelled: &[Order],
) -> DerivedViews {
    let open_orders = compute_open_orders(all, filled, cancelled);
    for violation in &open_orders.violations {
        warn!(?violation, "Order stream integrity violation");
    }

    DerivedViews {
        version,
        order_book: build_order_book(&open_orders.orders),
        trade_history: build_trade_history(filled),
        price_chart: build_price_chart(filled),
        open_orders,
        filled: filled.to_vec(),
    }
}

/// Memoizing compiler.
///
/// Holds the last result and hands it back while the store version is
/// unchanged, so repeated reads between events do no work.
#[derive(Debug, Default)]
pub struct ViewCompiler {
    cached: Mutex<Option<Arc<DerivedViews>>>,
}

impl ViewCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Views for the current store contents, or `None` until all three order
    /// streams have loaded.
    pub fn compile(
        &self,
        store: &EventStore,
        statuses: &StreamStatuses,
    ) -> Option<Arc<DerivedViews>> {
        if !statuses.all_loaded() {
            return None;
        }

        let version = store.version();
        let mut cached = match self.cached.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(views) = cached.as_ref().filter(|v| v.version == version) {
            return Some(Arc::clone(views));
        }

        debug!(?version, "Recompiling derived views");
        let views = Arc::new(compile_views(
            version,
            store.orders(),
            store.trades(),
            store.cancels(),
        ));
        *cached = Some(Arc::clone(&views));
        Some(views)
    }
}
