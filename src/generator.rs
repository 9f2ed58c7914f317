//! Synthetic order generator.
//!
//! Seeds the book with random liquidity through its public insert
//! operation, contending on the book lock with live dispatch-loop traffic.

use rand::Rng;
use rust_decimal::Decimal;
use tracing::info;

use crate::orderbook::{OrderBook, Side};

/// Insert `count` random (price, quantity) pairs on both sides of the book.
///
/// Prices fall in [100.00, 200.00] and quantities in [1.00, 50.00], two
/// decimal places; each iteration applies the same pair to the bid and the
/// ask side.
pub fn generate_random_orders(book: &OrderBook, count: usize) {
    let mut rng = rand::thread_rng();

    for _ in 0..count {
        let price = Decimal::new(rng.gen_range(10_000..=20_000), 2);
        let quantity = Decimal::new(rng.gen_range(100..=5_000), 2);
        book.insert(Side::Bid, price, quantity);
        book.insert(Side::Ask, price, quantity);
    }

    info!("seeded {count} random bid/ask pairs");
}
