use rust_decimal::Decimal;
use std::fmt;

/// Price of a resting level. `Decimal` keeps map keys totally ordered and
/// quantity sums exact.
pub type Price = Decimal;
/// Quantity resting at a price level.
pub type Quantity = Decimal;

/// Side of the book an entry rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Buy interest, displayed from highest price to lowest
    Bid,
    /// Sell interest, displayed from lowest price to highest
    Ask,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "BID"),
            Side::Ask => write!(f, "ASK"),
        }
    }
}
