//! Per-pair ladders, id directory, and the price-time-priority matching
//! algorithm.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    clock::{Clock, SystemClock},
    errors::EngineError,
    instrument::Symbol,
    order::{Order, OrderType, Side},
    trade::Trade,
};

/// Number of levels `MatchingEngine::market_data` pulls per side unless told
/// otherwise.
pub const DEFAULT_DEPTH: usize = 10;

/// One side's ladder: price -> FIFO queue of resting order ids at that
/// price. Orders themselves live in [`OrderBook::directory`]; a ladder only
/// ever holds ids, so there is exactly one owner of each `Order` at all
/// times and no back-pointers between the two need to stay in sync.
type Ladder = BTreeMap<u64, VecDeque<u64>>;

/// A single (price, aggregated remaining quantity) row of a depth snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: u64,
    pub quantity: u64,
}

/// Internal enum unifying forward (ascending) and reverse (descending)
/// iteration over a [`Ladder`], so the matching loop below can walk asks
/// best-first (ascending) or bids best-first (descending) through the same
/// code path.
enum EitherIter<'a> {
    Fwd(std::collections::btree_map::IterMut<'a, u64, VecDeque<u64>>),
    Rev(std::iter::Rev<std::collections::btree_map::IterMut<'a, u64, VecDeque<u64>>>),
}

impl<'a> Iterator for EitherIter<'a> {
    type Item = (&'a u64, &'a mut VecDeque<u64>);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            EitherIter::Fwd(iter) => iter.next(),
            EitherIter::Rev(iter) => iter.next(),
        }
    }
}

/// Is `resting_price` acceptable for a limit taker with `limit_price` on
/// `side`? Buys can only cross at or below their limit; sells only at or
/// above theirs. Market takers never call this — they sweep unconditionally.
fn price_acceptable(side: Side, limit_price: u64, resting_price: u64) -> bool {
    match side {
        Side::Buy => resting_price <= limit_price,
        Side::Sell => resting_price >= limit_price,
    }
}

/// Matches `taker` against one ladder, mutating both the ladder and the
/// shared `directory` as makers fill, and returns the trades produced in
/// execution order.
///
/// `reversed` selects descending (bids) vs. ascending (asks) best-first
/// iteration; the caller picks it based on which side of the book `taker`
/// is walking into.
fn match_against(
    taker: &mut Order,
    ladder: &mut Ladder,
    directory: &mut HashMap<u64, Order>,
    reversed: bool,
    clock: &dyn Clock,
) -> Vec<Trade> {
    let mut trades = Vec::new();
    let mut drained_levels = Vec::new();

    let iter = if reversed {
        EitherIter::Rev(ladder.iter_mut().rev())
    } else {
        EitherIter::Fwd(ladder.iter_mut())
    };

    'outer: for (&price, ids) in iter {
        if taker.order_type == OrderType::Limit && !price_acceptable(taker.side, taker.price, price)
        {
            break 'outer;
        }
        while taker.remaining() > 0 {
            let Some(&maker_id) = ids.front() else {
                break;
            };
            let maker = directory
                .get_mut(&maker_id)
                .expect("order id present in a price level must be present in the directory");

            let qty = taker.remaining().min(maker.remaining());
            taker.apply_fill(qty);
            maker.apply_fill(qty);

            let (buyer_order_id, seller_order_id) = match taker.side {
                Side::Buy => (taker.id, maker.id),
                Side::Sell => (maker.id, taker.id),
            };
            trace!(buyer_order_id, seller_order_id, price, qty, "trade executed");
            trades.push(Trade {
                buyer_order_id,
                seller_order_id,
                price,
                quantity: qty,
                timestamp: clock.now(),
            });

            if maker.is_filled() {
                ids.pop_front();
                directory.remove(&maker_id);
            }
            if ids.is_empty() {
                drained_levels.push(price);
            }
            if taker.is_filled() {
                break 'outer;
            }
        }
    }

    for price in drained_levels {
        ladder.remove(&price);
    }
    trades
}

/// Bids, asks, and the id directory for exactly one trading pair.
///
/// Invariant maintained by every public method: an order id appears in
/// `directory` if and only if it is resting on one of the two ladders with
/// status `Pending` or `Partial`.
pub struct OrderBook {
    symbol: Symbol,
    bids: Ladder,
    asks: Ladder,
    directory: HashMap<u64, Order>,
    clock: Arc<dyn Clock>,
}

impl OrderBook {
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self::with_clock(symbol, Arc::new(SystemClock))
    }

    pub fn with_clock(symbol: impl Into<Symbol>, clock: Arc<dyn Clock>) -> Self {
        OrderBook {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            directory: HashMap::new(),
            clock,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Matches `order` against the opposite side, then rests any unfilled
    /// limit remainder on its own side. Returns the trades produced, in
    /// execution order.
    ///
    /// Fails with [`EngineError::WrongPair`] if `order.symbol` does not
    /// match this book's symbol — a caller-side bug the engine is
    /// responsible for preventing before it ever reaches a book.
    pub fn insert(&mut self, mut order: Order) -> Result<Vec<Trade>, EngineError> {
        if order.symbol != self.symbol {
            return Err(EngineError::WrongPair);
        }
        debug!(order_id = order.id, side = ?order.side, order_type = ?order.order_type, price = order.price, quantity = order.quantity, "inserting order");

        let trades = match order.side {
            Side::Buy => match_against(&mut order, &mut self.asks, &mut self.directory, false, self.clock.as_ref()),
            Side::Sell => match_against(&mut order, &mut self.bids, &mut self.directory, true, self.clock.as_ref()),
        };

        if order.order_type == OrderType::Limit && order.remaining() > 0 {
            self.rest(order);
        }
        Ok(trades)
    }

    fn rest(&mut self, order: Order) {
        let id = order.id;
        debug!(order_id = id, price = order.price, remaining = order.remaining(), "resting order");
        let ladder = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        ladder.entry(order.price).or_default().push_back(id);
        self.directory.insert(id, order);
    }

    /// Removes `id` from its price level and the directory, marking it
    /// cancelled. Returns `true` iff `id` was resting; an unknown or
    /// already-terminal id is not an error — it simply returns `false`.
    pub fn cancel(&mut self, id: u64) -> bool {
        let Some(mut order) = self.directory.remove(&id) else {
            return false;
        };
        order.cancel();
        debug!(order_id = id, "order cancelled");

        let ladder = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(ids) = ladder.get_mut(&order.price) {
            if let Some(pos) = ids.iter().position(|&queued| queued == id) {
                ids.remove(pos);
            }
            if ids.is_empty() {
                ladder.remove(&order.price);
            }
        }
        true
    }

    /// Best (highest) resting bid price, or `None` if the bid side is empty.
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.keys().next_back().copied()
    }

    /// Best (lowest) resting ask price, or `None` if the ask side is empty.
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.keys().next().copied()
    }

    /// The first `k` price levels of `side` in best-first order, each
    /// aggregated as (price, total remaining quantity). Shallower than `k`
    /// levels are returned as-is if the book is thinner.
    pub fn depth(&self, side: Side, k: usize) -> Vec<DepthLevel> {
        let levels: Box<dyn Iterator<Item = (&u64, &VecDeque<u64>)>> = match side {
            Side::Buy => Box::new(self.bids.iter().rev()),
            Side::Sell => Box::new(self.asks.iter()),
        };
        levels
            .take(k)
            .map(|(&price, ids)| {
                let quantity = ids
                    .iter()
                    .map(|id| self.directory[id].remaining())
                    .sum();
                DepthLevel { price, quantity }
            })
            .collect()
    }

    /// Every resting order belonging to `user`, in unspecified order.
    pub fn user_orders(&self, user: &str) -> Vec<Order> {
        self.directory
            .values()
            .filter(|order| order.user == user)
            .cloned()
            .collect()
    }

    /// A consistent two-sided depth view, `k` levels per side, taken under a
    /// single borrow so bid and ask depth always reflect the same instant.
    pub fn depth_snapshot(&self, k: usize) -> (Vec<DepthLevel>, Vec<DepthLevel>) {
        (self.depth(Side::Buy, k), self.depth(Side::Sell, k))
    }
}
