//! Demo binary for the matching engine: replay a scenario file of
//! orders and cancellations against a live engine on a dedicated
//! thread, or run a small built-in demo scenario.
//!
//! Not a wire protocol — scenario replay is a local convenience for
//! exercising the engine from a file instead of a live socket.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use order_book_engine::{EngineConfig, MatchingEngine, Order, OrderType, Side};
use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "order-book-cli")]
#[command(version = "0.1", about = "A demo of the single-symbol matching engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON scenario file of orders/cancels against a fresh engine.
    Replay {
        /// Path to a JSON array of scenario steps (see ScenarioStep).
        scenario: PathBuf,
        #[arg(long, default_value = "TEST")]
        symbol: String,
        #[arg(long, default_value_t = 1024)]
        buffer_capacity: usize,
    },
    /// Run a small built-in demo scenario (a single exact match).
    Demo {
        #[arg(long, default_value = "TEST")]
        symbol: String,
    },
}

/// One step of a scenario file. `side`/`order_type` are deserialized
/// from their Rust enum's Debug-matching variant names ("Buy", "Sell",
/// "Limit", "Market") via serde's default enum representation.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum ScenarioStep {
    NewOrder {
        id: u64,
        user_id: u64,
        side: Side,
        order_type: OrderType,
        price: f64,
        size: f64,
        timestamp: u64,
    },
    Cancel {
        order_id: u64,
    },
}

fn init_tracing() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("tracing subscriber already set");
}

fn run_steps(steps: Vec<ScenarioStep>, symbol: String, buffer_capacity: usize) -> anyhow::Result<()> {
    let config = EngineConfig::new(symbol, buffer_capacity)?;
    let (engine, handle) = MatchingEngine::new(config);
    let worker = thread::spawn(move || engine.run());

    for step in steps {
        match step {
            ScenarioStep::NewOrder { id, user_id, side, order_type, price, size, timestamp } => {
                let order = Order::new(id, user_id, side, order_type, price, size, timestamp)?;
                handle.submit_order(order)?;
            }
            ScenarioStep::Cancel { order_id } => {
                handle.cancel_order(order_id)?;
            }
        }
    }

    // Give the consumer a moment to drain before stopping; `stop` itself
    // waits for drain, but a short pause keeps log ordering readable.
    thread::sleep(Duration::from_millis(100));
    handle.stop();
    worker.join().expect("engine thread panicked");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { scenario, symbol, buffer_capacity } => {
            let file = File::open(&scenario)?;
            let steps: Vec<ScenarioStep> = serde_json::from_reader(BufReader::new(file))?;
            tracing::info!(path = %scenario.display(), steps = steps.len(), "replaying scenario");
            run_steps(steps, symbol, buffer_capacity)?;
        }
        Commands::Demo { symbol } => {
            let steps = vec![
                ScenarioStep::NewOrder {
                    id: 1,
                    user_id: 1,
                    side: Side::Sell,
                    order_type: OrderType::Limit,
                    price: 100.0,
                    size: 10.0,
                    timestamp: 1,
                },
                ScenarioStep::NewOrder {
                    id: 2,
                    user_id: 2,
                    side: Side::Buy,
                    order_type: OrderType::Limit,
                    price: 100.0,
                    size: 10.0,
                    timestamp: 2,
                },
            ];
            run_steps(steps, symbol, 16)?;
        }
    }

    Ok(())
}
