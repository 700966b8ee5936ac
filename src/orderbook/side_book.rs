//! One side of the book: price levels ordered for best-first traversal.
//!
//! A single `BTreeMap<OrderedPrice, PriceLevel>` does the job for both
//! sides, with the sort order flipped for bids via a side-aware key
//! wrapper, so `best_price()` is always "the first entry" regardless
//! of side.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::price_level::PriceLevel;
use crate::order::{Price, Side};

/// Wraps a price so that `BTreeMap`'s natural ascending order produces
/// best-first iteration for both sides: ascending for asks (lowest ask
/// first), descending for bids (highest bid first).
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedPrice {
    price: Price,
    side: Side,
}

impl Eq for OrderedPrice {}

impl PartialOrd for OrderedPrice {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedPrice {
    fn cmp(&self, other: &Self) -> Ordering {
        // Prices are validated non-negative, finite f64s (order.rs), so
        // total_cmp is a safe total order here.
        let ord = self.price.total_cmp(&other.price);
        match self.side {
            Side::Buy => ord.reverse(),
            Side::Sell => ord,
        }
    }
}

/// One side (bids or asks) of a symbol's book.
#[derive(Debug)]
pub struct SideBook {
    side: Side,
    levels: BTreeMap<OrderedPrice, PriceLevel>,
}

impl SideBook {
    pub fn new(side: Side) -> Self {
        Self { side, levels: BTreeMap::new() }
    }

    fn key(&self, price: Price) -> OrderedPrice {
        OrderedPrice { price, side: self.side }
    }

    /// Returns the level at `price`, creating an empty one if absent.
    pub fn get_or_create(&mut self, price: Price) -> &mut PriceLevel {
        let side = self.side;
        self.levels
            .entry(self.key(price))
            .or_insert_with(|| PriceLevel::new(price, side))
    }

    pub fn get(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&self.key(price))
    }

    pub fn get_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&self.key(price))
    }

    /// Drops the level at `price` if it exists and is empty. Called by
    /// the book after a match or cancel may have drained a level.
    pub fn remove_if_empty(&mut self, price: Price) {
        let key = self.key(price);
        if self.levels.get(&key).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&key);
        }
    }

    /// The best (highest bid / lowest ask) price currently resting.
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().map(|k| k.price)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// The best level, if any, mutable — used by the matching loop to
    /// repeatedly match against the current best price.
    pub fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        self.levels.values_mut().next()
    }

    /// Best-first iteration over resting levels, immutable.
    pub fn levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.levels.values()
    }
}
