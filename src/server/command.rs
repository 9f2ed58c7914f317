//! Wire commands recognized by the dispatch loop.
//!
//! The protocol is plain text, unframed, one command per connection, with
//! no reply. The payload carries no price or quantity: the insert commands
//! apply method-fixed levels, a deliberate limitation of the modeled
//! command set.

use rust_decimal::Decimal;

use crate::orderbook::types::{Price, Quantity};

/// A recognized client request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Insert the fixed bid level
    InsertBid,
    /// Insert the fixed ask level
    InsertAsk,
    /// Render the book snapshot to the server console
    DisplayOrderBook,
}

impl Request {
    /// Parse one request payload.
    ///
    /// The payload is truncated at the first NUL byte (a zero-filled read
    /// buffer terminates there) and then compared verbatim, case-sensitive,
    /// with no trimming: `insertBid\n` is not a command. Anything
    /// unrecognized yields `None` and is silently dropped by the caller.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
        match &payload[..end] {
            b"insertBid" => Some(Request::InsertBid),
            b"insertAsk" => Some(Request::InsertAsk),
            b"displayOrderBook" => Some(Request::DisplayOrderBook),
            _ => None,
        }
    }
}

/// Fixed level applied by `insertBid`: 10.00 at 150.00.
pub fn fixed_bid() -> (Price, Quantity) {
    (Decimal::new(15000, 2), Decimal::new(1000, 2))
}

/// Fixed level applied by `insertAsk`: 10.00 at 155.00.
pub fn fixed_ask() -> (Price, Quantity) {
    (Decimal::new(15500, 2), Decimal::new(1000, 2))
}
