//! The FIFO queue of resting orders at one price, on one side.
//!
//! Matching walks the head of the queue, fills `min(incoming.remaining,
//! resting.remaining)`, and only advances past a resting order once it
//! is fully filled — a partial fill always stops the loop, since a
//! partially filled resting order means the incoming order is now
//! exhausted.

use super::fifo::{Fifo, Handle};
use crate::order::{Order, Side};
use crate::trade::Trade;

/// FIFO of active orders resting at a single price on a single side.
#[derive(Debug)]
pub struct PriceLevel {
    pub price: f64,
    pub side: Side,
    orders: Fifo<Order>,
}

impl PriceLevel {
    pub fn new(price: f64, side: Side) -> Self {
        Self { price, side, orders: Fifo::new() }
    }

    /// Appends `order` to the tail of the FIFO. Panics in debug builds
    /// if `order.side` doesn't match this level's side — a caller bug,
    /// not a runtime condition.
    pub fn add(&mut self, order: Order) -> Handle {
        debug_assert_eq!(order.side, self.side, "order side must match the level's side");
        debug_assert!(order.remaining() > 0.0, "resting order must have remaining > 0");
        self.orders.push_back(order)
    }

    /// Removes the order at `handle` (cancel path). Panics on a stale
    /// handle — see `Fifo::remove`.
    pub fn remove(&mut self, handle: Handle) -> Order {
        self.orders.remove(handle)
    }

    /// Peeks the oldest resting order without removing it.
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Reads the order at `handle` without removing it. Panics on a
    /// stale handle — see `Fifo::get`.
    pub fn get(&self, handle: Handle) -> &Order {
        self.orders.get(handle)
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Matches `incoming` against this level's FIFO until `incoming` is
    /// filled or the level is exhausted.
    ///
    /// The caller (`OrderBook::add`) is responsible for removing this
    /// level from its `SideBook` afterwards if it becomes empty — this
    /// method only drains the FIFO and must not remove the level itself
    /// mid-traversal. It also never touches `OrderBook`'s id index —
    /// `filled_maker_ids` in the returned `MatchResult` tells the caller
    /// exactly which resting ids it just fully removed, so the caller
    /// can purge their index entries before those ids' `Fifo` slots get
    /// recycled by a later `add`.
    pub fn match_against(&mut self, incoming: &mut Order, now: u64) -> MatchResult {
        let mut trades = Vec::new();
        let mut filled_maker_ids = Vec::new();
        while incoming.remaining() > 0.0 {
            let Some(resting) = self.orders.front_mut() else {
                break;
            };
            let qty = incoming.remaining().min(resting.remaining());
            if qty <= 0.0 {
                break;
            }

            // Build the trade and apply the fill before a fully filled
            // resting order is popped off the queue.
            let trade = Trade {
                maker_order_id: resting.id,
                taker_order_id: incoming.id,
                price: resting.price,
                quantity: qty,
                maker_side: resting.side,
                timestamp: now,
            };
            resting
                .fill(qty)
                .expect("qty is min(incoming.remaining, resting.remaining)");
            incoming
                .fill(qty)
                .expect("qty is min(incoming.remaining, resting.remaining)");
            trades.push(trade);

            if resting.is_filled() {
                let maker_id = resting.id;
                self.orders.pop_front();
                filled_maker_ids.push(maker_id);
            } else {
                // Resting order only partially filled: it absorbed all
                // of incoming's remaining quantity, so the loop's own
                // condition (`incoming.remaining() > 0.0`) will end it.
                break;
            }
        }
        MatchResult { trades, filled_maker_ids }
    }
}

/// The outcome of one `PriceLevel::match_against` call.
#[derive(Debug, Default)]
pub struct MatchResult {
    /// One entry per `(incoming, resting, qty)` fill applied, in order.
    pub trades: Vec<Trade>,
    /// Ids of resting orders this call fully filled and popped off the
    /// FIFO — the caller must purge these from `OrderBook`'s id index.
    pub filled_maker_ids: Vec<u64>,
}
