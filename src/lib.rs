//! A single-symbol limit-order matching engine: price-time priority
//! matching over a resting order book, driven by a single-consumer
//! command queue.
//!
//! Leaf-to-root: [`order`] (the mutable order record) is consumed by
//! [`orderbook`] (FIFO price levels, price-ordered sides, the book
//! itself), which [`engine`] drives from a bounded command queue.
//! [`config`] holds the engine's two construction knobs; [`trade`] is
//! the fill record the book emits as it matches.

pub mod config;
pub mod engine;
pub mod order;
pub mod orderbook;
pub mod trade;

pub use config::EngineConfig;
pub use engine::{Command, EngineError, EngineHandle, MatchingEngine};
pub use order::{Order, OrderError, OrderStatus, OrderType, Price, Quantity, Side};
pub use orderbook::{AddOutcome, BookError, OrderBook};
pub use trade::Trade;
