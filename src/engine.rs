//! The single-consumer command queue driving one `OrderBook`.
//!
//! A cheap, cloneable `EngineHandle` is the producer side; `run` owns
//! the book and drains commands from a bounded channel on whatever
//! thread it's started on. The producer API is a synchronous blocking
//! send, not a oneshot-reply future — callers don't wait on a result,
//! only on back-pressure from a full queue.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::order::Order;
use crate::orderbook::{AddOutcome, OrderBook};

/// How often the consumer loop wakes with no new command, purely to
/// notice a `stop()` call against an otherwise-idle queue.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

const CONSTRUCTED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPING: u8 = 2;
const STOPPED: u8 = 3;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("engine is stopping or stopped; command rejected")]
    Closed,
}

/// A command accepted onto the engine's queue. Carries only the data
/// its own case needs — no fields shared between variants.
#[derive(Debug)]
pub enum Command {
    NewOrder(Order),
    Cancel(u64),
}

/// The cheap, `Clone`-able producer side: enqueue orders and
/// cancellations from any number of concurrent callers.
#[derive(Clone)]
pub struct EngineHandle {
    sender: Sender<Command>,
    state: Arc<AtomicU8>,
}

impl EngineHandle {
    /// Enqueues a `NewOrder` command, blocking if the queue is full.
    ///
    /// # Errors
    /// `EngineError::Closed` if `stop()` has already been called.
    pub fn submit_order(&self, order: Order) -> Result<(), EngineError> {
        self.send(Command::NewOrder(order))
    }

    /// Enqueues a `Cancel` command, blocking if the queue is full.
    pub fn cancel_order(&self, order_id: u64) -> Result<(), EngineError> {
        self.send(Command::Cancel(order_id))
    }

    fn send(&self, command: Command) -> Result<(), EngineError> {
        if self.state.load(Ordering::Acquire) >= STOPPING {
            return Err(EngineError::Closed);
        }
        // A command can still land here in the narrow window between
        // this check and a concurrent stop(); that is fine, it is
        // drained along with everything else already queued.
        self.sender.send(command).map_err(|_| EngineError::Closed)
    }

    /// Moves the engine to Stopping. Idempotent: a second call is a
    /// harmless no-op. Already-queued commands are drained by `run`
    /// before it exits.
    pub fn stop(&self) {
        self.state
            .compare_exchange(RUNNING, STOPPING, Ordering::AcqRel, Ordering::Acquire)
            .or_else(|_| {
                self.state
                    .compare_exchange(CONSTRUCTED, STOPPING, Ordering::AcqRel, Ordering::Acquire)
            })
            .ok();
    }
}

/// The single-consumer half: owns the `OrderBook` and the receiving end
/// of the queue. Intended to be moved onto a dedicated thread and driven
/// with `run`.
pub struct MatchingEngine {
    config: EngineConfig,
    receiver: Receiver<Command>,
    state: Arc<AtomicU8>,
    book: OrderBook,
    next_command_ordinal: u64,
}

impl MatchingEngine {
    /// Builds an engine plus its cloneable producer handle.
    pub fn new(config: EngineConfig) -> (Self, EngineHandle) {
        let (sender, receiver) = bounded(config.buffer_capacity);
        let state = Arc::new(AtomicU8::new(CONSTRUCTED));
        let engine = Self {
            config,
            receiver,
            state: state.clone(),
            book: OrderBook::new(),
            next_command_ordinal: 0,
        };
        let handle = EngineHandle { sender, state };
        (engine, handle)
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Consumer loop: dequeue commands in FIFO order and dispatch them
    /// to the book until the queue is closed and drained. Intended to
    /// run on a dedicated thread.
    pub fn run(mut self) {
        self.state
            .compare_exchange(CONSTRUCTED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .ok();
        info!(symbol = %self.config.symbol, "matching engine starting");

        loop {
            match self.receiver.recv_timeout(IDLE_POLL_INTERVAL) {
                Ok(command) => self.dispatch(command),
                Err(RecvTimeoutError::Timeout) => {
                    if self.state.load(Ordering::Acquire) >= STOPPING && self.receiver.is_empty() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.state.store(STOPPED, Ordering::Release);
        info!(
            symbol = %self.config.symbol,
            best_bid = ?self.book.best_bid(),
            best_ask = ?self.book.best_ask(),
            bid_levels = self.book.bid_level_count(),
            ask_levels = self.book.ask_level_count(),
            "matching engine stopped, final book snapshot"
        );
    }

    fn dispatch(&mut self, command: Command) {
        let now = self.next_command_ordinal;
        self.next_command_ordinal += 1;

        match command {
            Command::NewOrder(order) => match self.book.add(order, now) {
                Ok(AddOutcome { trades, final_order }) => {
                    for trade in &trades {
                        debug!(
                            maker = trade.maker_order_id,
                            taker = trade.taker_order_id,
                            price = trade.price,
                            qty = trade.quantity,
                            "trade"
                        );
                    }
                    debug!(
                        order_id = final_order.id,
                        remaining = final_order.remaining(),
                        status = ?final_order.status,
                        "order processed"
                    );
                }
                Err(err) => warn!(error = %err, "rejected NewOrder command"),
            },
            Command::Cancel(order_id) => {
                let cancelled = self.book.cancel(order_id);
                debug!(order_id, cancelled, "processed Cancel command");
            }
        }
    }
}
