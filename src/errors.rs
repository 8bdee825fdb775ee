use thiserror::Error;

use crate::instrument::Symbol;

/// The core's error taxonomy.
///
/// [`EngineError::WrongPair`] is a structural-bug signal, not something a
/// caller of [`crate::engine::MatchingEngine`] can trigger in normal flow —
/// the engine always constructs orders for the book it is about to insert
/// them into. It only surfaces from a direct, deliberately-mismatched
/// [`crate::orderbook::OrderBook::insert`] call (see the unit test in
/// `orderbook.rs` that exercises exactly that).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `quantity` was not positive, or a limit order's `price` was not positive.
    #[error("quantity and, for limit orders, price must be positive")]
    InvalidArgument,

    /// The symbol named in the request has no registered book.
    #[error("unknown trading pair: {0}")]
    UnknownPair(Symbol),

    /// An order was handed to a book whose symbol it does not share.
    #[error("order's symbol does not match this book's symbol")]
    WrongPair,
}
