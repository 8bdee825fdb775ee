use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// An immutable record of a single match.
///
/// - `price` is always the resting (maker) order's limit price — price
///   improvement favours whichever side arrived as the taker.
/// - `buyer_order_id`/`seller_order_id` are derived from the two matched
///   orders' sides, not from which one was the taker; correlate against the
///   id returned by the submission that caused the trade to tell taker from
///   maker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub buyer_order_id: u64,
    pub seller_order_id: u64,
    pub price: u64,
    pub quantity: u64,
    pub timestamp: SystemTime,
}
