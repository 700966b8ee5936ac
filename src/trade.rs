//! A matched trade, emitted once per `(incoming, resting, qty)` fill.
//!
//! `PriceLevel::match_against` builds one of these for every fill it
//! applies, before the resting order leaves its queue if that fill
//! exhausts it.

use crate::order::{Price, Quantity, Side};

/// A trade executes at the resting (maker) order's price; the taker's
/// limit price is only a gate, never the execution price.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub maker_order_id: u64,
    pub taker_order_id: u64,
    pub price: Price,
    pub quantity: Quantity,
    /// The side of the book the maker order rested on.
    pub maker_side: Side,
    pub timestamp: u64,
}
