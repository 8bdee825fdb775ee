//! A price-time-priority limit order book and matching engine for spot
//! trading of fungible instruments.
//!
//! The crate is an in-process library, not a network service: given a
//! stream of order submissions and cancellations for one or more trading
//! pairs, [`engine::MatchingEngine`] maintains the resting bid and ask books
//! per pair, matches incoming orders under strict price-time priority, and
//! returns the resulting trades together with an up-to-date depth view.
//!
//! Settlement, balances, wire protocols, persistence, fees, and order
//! qualifiers beyond plain market/limit are all out of scope — those are
//! the job of whatever embeds this crate.

pub mod clock;
pub mod engine;
pub mod errors;
pub mod instrument;
pub mod order;
pub mod orderbook;
pub mod trade;
