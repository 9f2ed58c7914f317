//! Price-ordered order book ledger with a readiness-driven network front end.
//!
//! The crate pairs two components:
//!
//! 1. [`OrderBook`]: a mutex-guarded ledger of bid and ask price levels.
//!    Duplicate prices accumulate as separate entries until [`OrderBook::aggregate`]
//!    collapses them; [`OrderBook::snapshot`] pairs the k-th best level of each
//!    side into display rows.
//! 2. [`DispatchServer`]: a single-threaded, non-blocking dispatch loop that
//!    multiplexes client connections, reads one plain-text command per
//!    connection, applies it to the ledger, and closes the connection without
//!    replying.
//!
//! The ledger is the sole synchronization point: the dispatch loop and the
//! random order generator mutate it concurrently through its internal lock,
//! and a lock-free operational flag signals cooperative shutdown.

pub mod config;
pub mod generator;
pub mod orderbook;
pub mod server;

// Re-export main types for convenience
pub use config::Config;
pub use orderbook::{DepthRow, InsertError, OrderBook, Price, PriceLevel, Quantity, Side};
pub use server::DispatchServer;
