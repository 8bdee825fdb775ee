use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::instrument::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
}

/// Where an order sits in its own lifecycle.
///
/// `Filled` and `Cancelled` are terminal — nothing transitions out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Partial,
    Filled,
    Cancelled,
}

/// Identity plus mutable fill state for a single order.
///
/// Prices and quantities are fixed-point integers (ticks) rather than
/// floating point — floats would let equal-looking decimal prices fail to
/// coincide in the ladder.
///
/// `price` is ignored for `OrderType::Market` (the engine normalizes it to
/// `0` at submission). Mutation of `filled`/`status` is confined to the
/// owning [`crate::orderbook::OrderBook`], via [`Order::apply_fill`] and
/// [`Order::cancel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub user: String,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub price: u64,
    pub quantity: u64,
    pub filled: u64,
    pub status: OrderStatus,
    pub timestamp: SystemTime,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: u64,
        user: String,
        symbol: Symbol,
        side: Side,
        order_type: OrderType,
        price: u64,
        quantity: u64,
        timestamp: SystemTime,
    ) -> Self {
        Order {
            id,
            user,
            symbol,
            side,
            order_type,
            price,
            quantity,
            filled: 0,
            status: OrderStatus::Pending,
            timestamp,
        }
    }

    /// Quantity still awaiting a counterparty.
    pub fn remaining(&self) -> u64 {
        self.quantity - self.filled
    }

    pub fn is_filled(&self) -> bool {
        self.filled == self.quantity
    }

    /// Records `qty` as matched and transitions `status` accordingly.
    ///
    /// `qty` must never exceed `remaining()` — the matching loop in
    /// `orderbook.rs` enforces that by construction (`qty =
    /// min(taker.remaining(), maker.remaining())`).
    pub(crate) fn apply_fill(&mut self, qty: u64) {
        debug_assert!(qty <= self.remaining(), "fill exceeds remaining quantity");
        self.filled += qty;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
    }

    pub(crate) fn cancel(&mut self) {
        self.status = OrderStatus::Cancelled;
    }
}
