//! Randomized command sequences checking the book's core invariants
//! hold under arbitrary order flow: never crossed, fills always bounded
//! by order size, and cancel is idempotent.

use rand::Rng;
use std::collections::HashMap;

use order_book_engine::{Order, OrderBook, OrderStatus, OrderType, Side};

/// Drives thousands of random commands against a fresh book, checking
/// fill bounds, the never-crossed invariant, and trade sanity after
/// every `add`.
#[test]
fn randomized_commands_never_violate_core_invariants() {
    let mut rng = rand::rng();
    let mut book = OrderBook::new();

    // id -> (size, running filled as observed from outside the book)
    let mut known: HashMap<u64, f64> = HashMap::new();
    let mut next_id = 1u64;

    for step in 0..5_000u64 {
        let is_cancel = !known.is_empty() && rng.random_ratio(1, 5);

        if is_cancel {
            let ids: Vec<u64> = known.keys().copied().collect();
            let id = ids[rng.random_range(0..ids.len())];
            // Cancel is idempotent — calling it twice in a row leaves
            // the second call a no-op.
            let first = book.cancel(id);
            let second = book.cancel(id);
            assert!(!second, "second cancel of {id} must be a no-op");
            let _ = first;
            known.remove(&id);
            continue;
        }

        let id = next_id;
        next_id += 1;
        let side = if rng.random_bool(0.5) { Side::Buy } else { Side::Sell };
        let order_type = if rng.random_ratio(1, 10) { OrderType::Market } else { OrderType::Limit };
        // Narrow price band so crosses and sweeps actually happen.
        let price = (90 + rng.random_range(0..20)) as f64;
        let size = 1.0 + rng.random_range(0..10) as f64;

        let order = Order::new(id, 1, side, order_type, price, size, step).unwrap();
        let out = book.add(order, step).unwrap();

        // 0 <= filled <= size for the order just processed.
        assert!(out.final_order.filled >= 0.0);
        assert!(out.final_order.filled <= out.final_order.size);

        // Every trade's quantity is sane: positive and bounded by the
        // incoming order's own size.
        for trade in &out.trades {
            assert!(trade.quantity > 0.0);
            assert!(trade.quantity <= out.final_order.size);
        }

        if order_type == OrderType::Limit && out.final_order.remaining() > 0.0 {
            known.insert(id, out.final_order.size);
        }

        // The book is never left crossed.
        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            assert!(bid < ask, "book crossed: best_bid {bid} >= best_ask {ask}");
        }

        // Every order still tracked as resting must be active.
        if known.contains_key(&id) {
            assert!(out.final_order.is_active());
            assert_ne!(out.final_order.status, OrderStatus::Cancelled);
        }
    }
}

/// Drains every order the randomized run left resting, checking the
/// book converges back to empty with no leftover levels.
#[test]
fn fully_drained_book_has_no_levels_left() {
    let mut rng = rand::rng();
    let mut book = OrderBook::new();
    let mut resting_ids = Vec::new();

    for id in 1..=500u64 {
        let side = if rng.random_bool(0.5) { Side::Buy } else { Side::Sell };
        let price = (95 + rng.random_range(0..10)) as f64;
        let size = 1.0 + rng.random_range(0..5) as f64;
        let order = Order::new(id, 1, side, OrderType::Limit, price, size, id).unwrap();
        let out = book.add(order, id).unwrap();
        if out.final_order.remaining() > 0.0 {
            resting_ids.push(id);
        }
    }

    for id in resting_ids {
        book.cancel(id);
    }

    assert!(book.is_empty());
    assert_eq!(book.bid_level_count(), 0);
    assert_eq!(book.ask_level_count(), 0);
}
