//! Registry of books by pair symbol, id allocator, and the validating
//! façade in front of [`crate::orderbook::OrderBook`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    clock::{Clock, SystemClock},
    errors::EngineError,
    instrument::Symbol,
    order::{Order, OrderType, Side},
    orderbook::{DepthLevel, OrderBook, DEFAULT_DEPTH},
    trade::Trade,
};

/// A consolidated view of one pair's top of book and depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub symbol: Symbol,
    pub best_bid: Option<u64>,
    pub best_ask: Option<u64>,
    /// `best_ask - best_bid` when both sides are non-empty, `0` otherwise.
    pub spread: u64,
    pub bid_depth: Vec<DepthLevel>,
    pub ask_depth: Vec<DepthLevel>,
}

/// The pair registry and the engine-wide id counter, guarded by a single
/// lock. Looking a book up and allocating an id for a submission both
/// happen under one acquisition of this lock; the match itself runs under
/// the book's own lock, acquired only after this one is released.
struct Registry {
    books: HashMap<Symbol, Arc<Mutex<OrderBook>>>,
    next_id: u64,
}

/// Owns every registered [`OrderBook`], allocates order ids, validates
/// submissions, and exposes the consolidated query surface.
///
/// Every public method takes `&self` — `Registry` and each `OrderBook` carry
/// their own interior mutability, so `MatchingEngine` is safely callable
/// from multiple threads at once. Lock order is always
/// engine-registry-then-book; a book is never re-entered into the registry,
/// so no deadlock cycle is possible.
pub struct MatchingEngine {
    registry: RwLock<Registry>,
    total_orders: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        MatchingEngine {
            registry: RwLock::new(Registry {
                books: HashMap::new(),
                next_id: 1,
            }),
            total_orders: AtomicU64::new(0),
            clock,
        }
    }

    /// Idempotent: creates the book for `symbol` on first call and returns
    /// `true`; returns `false` if it already existed. Books are never
    /// removed while the engine lives.
    pub fn register_pair(&self, symbol: impl Into<Symbol>) -> bool {
        let symbol = symbol.into();
        let mut registry = self.registry.write().unwrap();
        if registry.books.contains_key(&symbol) {
            return false;
        }
        debug!(%symbol, "registering pair");
        registry.books.insert(
            symbol.clone(),
            Arc::new(Mutex::new(OrderBook::with_clock(symbol, self.clock.clone()))),
        );
        true
    }

    fn book_for(&self, symbol: &Symbol) -> Option<Arc<Mutex<OrderBook>>> {
        self.registry.read().unwrap().books.get(symbol).cloned()
    }

    /// Validates, allocates a strictly-increasing id, and inserts a new
    /// order into `symbol`'s book. Returns the trades the insertion
    /// produced.
    ///
    /// A failed submission (`InvalidArgument`/`UnknownPair`) leaves every
    /// book untouched and allocates no id.
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &self,
        user: impl Into<String>,
        symbol: impl Into<Symbol>,
        side: Side,
        order_type: OrderType,
        price: u64,
        quantity: u64,
    ) -> Result<Vec<Trade>, EngineError> {
        if quantity == 0 {
            warn!("submission rejected: quantity must be positive");
            return Err(EngineError::InvalidArgument);
        }
        if order_type == OrderType::Limit && price == 0 {
            warn!("submission rejected: limit price must be positive");
            return Err(EngineError::InvalidArgument);
        }
        let symbol = symbol.into();

        let (book, id) = {
            let mut registry = self.registry.write().unwrap();
            let Some(book) = registry.books.get(&symbol).cloned() else {
                warn!(%symbol, "submission rejected: unknown pair");
                return Err(EngineError::UnknownPair(symbol));
            };
            let id = registry.next_id;
            registry.next_id += 1;
            (book, id)
        };

        // Market orders carry no meaningful limit price; normalize to 0 so
        // it can never accidentally participate in a price comparison.
        let normalized_price = if order_type == OrderType::Limit { price } else { 0 };
        let order = Order::new(
            id,
            user.into(),
            symbol,
            side,
            order_type,
            normalized_price,
            quantity,
            self.clock.now(),
        );

        let trades = {
            let mut book = book.lock().unwrap();
            book.insert(order)
                .expect("engine always builds orders for the book it is about to insert them into")
        };
        self.total_orders.fetch_add(1, Ordering::Relaxed);
        Ok(trades)
    }

    /// Forwards to the named book's cancel. Returns `false` if the symbol is
    /// unknown or the id is not resting there.
    pub fn cancel(&self, id: u64, symbol: impl Into<Symbol>) -> bool {
        let symbol = symbol.into();
        match self.book_for(&symbol) {
            Some(book) => book.lock().unwrap().cancel(id),
            None => false,
        }
    }

    /// A consolidated snapshot of best bid/ask, spread, and depth for
    /// `symbol`. Fails with `UnknownPair` if no such book is registered.
    pub fn market_data(&self, symbol: impl Into<Symbol>) -> Result<MarketData, EngineError> {
        let symbol = symbol.into();
        let Some(book) = self.book_for(&symbol) else {
            return Err(EngineError::UnknownPair(symbol));
        };
        let book = book.lock().unwrap();
        let best_bid = book.best_bid();
        let best_ask = book.best_ask();
        let spread = match (best_bid, best_ask) {
            (Some(bid), Some(ask)) if ask >= bid => ask - bid,
            _ => 0,
        };
        let (bid_depth, ask_depth) = book.depth_snapshot(DEFAULT_DEPTH);
        Ok(MarketData {
            symbol: book.symbol().clone(),
            best_bid,
            best_ask,
            spread,
            bid_depth,
            ask_depth,
        })
    }

    /// Every resting order of `user` on `symbol`'s book, or empty if the
    /// symbol is unregistered.
    pub fn user_orders(&self, user: &str, symbol: impl Into<Symbol>) -> Vec<Order> {
        match self.book_for(&symbol.into()) {
            Some(book) => book.lock().unwrap().user_orders(user),
            None => Vec::new(),
        }
    }

    /// Count of submissions that were accepted (allocated an id), across
    /// every pair, for the lifetime of this engine.
    pub fn total_orders(&self) -> u64 {
        self.total_orders.load(Ordering::Relaxed)
    }

    /// Number of registered pairs.
    pub fn pair_count(&self) -> usize {
        self.registry.read().unwrap().books.len()
    }
}
