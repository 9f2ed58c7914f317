//! Core order book ledger module
//!
//! Owns all price/quantity state: the bid and ask sides, the lock that
//! serializes access to them, and the operational flag used for cooperative
//! shutdown.

pub mod book;
pub mod depth;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use book::OrderBook;
pub use depth::{render_depth, DepthRow, PriceLevel};
pub use error::InsertError;
pub use types::{Price, Quantity, Side};
