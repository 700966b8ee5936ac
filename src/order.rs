//! The mutable order record and its fill/cancel state machine.

use thiserror::Error;

/// Price is kept as a plain real number rather than fixed-point ticks —
/// see DESIGN.md's Open Question decision.
pub type Price = f64;
/// Quantity shares the same representation as price.
pub type Quantity = f64;

/// Which side of the book an order rests on or trades against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order of this side matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Limit orders rest on the book; market orders only ever take liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub enum OrderType {
    Limit,
    Market,
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
}

/// Fatal precondition violations a caller must not let happen.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    #[error("order size must be strictly positive, got {0}")]
    NonPositiveSize(Quantity),
    #[error("order price must be non-negative, got {0}")]
    NegativePrice(Price),
    #[error("fill quantity {qty} exceeds remaining {remaining}")]
    FillExceedsRemaining { qty: Quantity, remaining: Quantity },
}

/// A single order in the book.
///
/// `id`, `user_id`, `side`, `type`, `price`, `size`, and `timestamp` are
/// set once at construction by the caller, which is responsible for
/// assigning `id` and `timestamp` before submission. Only `filled` and
/// `status` are mutated afterward, via `fill`/`cancel`.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u64,
    pub user_id: u64,
    pub side: Side,
    pub order_type: OrderType,
    /// Ignored semantically for Market orders but retained for reporting.
    pub price: Price,
    pub size: Quantity,
    pub filled: Quantity,
    pub status: OrderStatus,
    pub timestamp: u64,
}

impl Order {
    /// Builds a new, unfilled order in `New` status.
    ///
    /// # Errors
    /// `NonPositiveSize` if `size <= 0`, `NegativePrice` if `price < 0`.
    pub fn new(
        id: u64,
        user_id: u64,
        side: Side,
        order_type: OrderType,
        price: Price,
        size: Quantity,
        timestamp: u64,
    ) -> Result<Self, OrderError> {
        if size <= 0.0 {
            return Err(OrderError::NonPositiveSize(size));
        }
        if price < 0.0 {
            return Err(OrderError::NegativePrice(price));
        }
        Ok(Self {
            id,
            user_id,
            side,
            order_type,
            price,
            size,
            filled: 0.0,
            status: OrderStatus::New,
            timestamp,
        })
    }

    /// `size - filled`.
    pub fn remaining(&self) -> Quantity {
        self.size - self.filled
    }

    /// `status ∈ {New, PartiallyFilled}`.
    pub fn is_active(&self) -> bool {
        matches!(self.status, OrderStatus::New | OrderStatus::PartiallyFilled)
    }

    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }

    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }

    pub fn is_market(&self) -> bool {
        self.order_type == OrderType::Market
    }

    pub fn is_limit(&self) -> bool {
        self.order_type == OrderType::Limit
    }

    /// Applies a fill of `qty`, updating `filled` and `status`.
    ///
    /// # Errors
    /// `FillExceedsRemaining` if `qty > remaining()`. Callers in this
    /// crate never pass such a `qty` (matching only ever fills
    /// `min(incoming.remaining(), resting.remaining())`); this check
    /// guards the invariant against any future caller that might.
    pub fn fill(&mut self, qty: Quantity) -> Result<(), OrderError> {
        debug_assert!(qty > 0.0, "fill() called with non-positive qty");
        let remaining = self.remaining();
        if qty > remaining {
            return Err(OrderError::FillExceedsRemaining { qty, remaining });
        }
        self.filled += qty;
        self.status = if self.filled >= self.size {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        Ok(())
    }

    /// Cancels the order if it is still active.
    ///
    /// Returns `true` and transitions to `Cancelled` iff the previous
    /// status was `New` or `PartiallyFilled`; otherwise a no-op
    /// returning `false`. Cancel never touches `filled`.
    pub fn cancel(&mut self) -> bool {
        if self.is_active() {
            self.status = OrderStatus::Cancelled;
            true
        } else {
            false
        }
    }

    /// Whether this order may match against a resting order quoted at
    /// `counter_price`: always true for Market, otherwise a price gate.
    pub fn can_match(&self, counter_price: Price) -> bool {
        match self.order_type {
            OrderType::Market => true,
            OrderType::Limit => match self.side {
                Side::Buy => self.price >= counter_price,
                Side::Sell => self.price <= counter_price,
            },
        }
    }
}
