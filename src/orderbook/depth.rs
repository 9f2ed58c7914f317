//! Snapshot rows and their console rendering.
//!
//! `displayOrderBook` is an administrative command: the table goes to the
//! server's console, never back to the requesting connection.

use std::fmt::Write;

use crate::orderbook::types::{Price, Quantity};

const PRICE_WIDTH: usize = 10;
const QUANTITY_WIDTH: usize = 15;

/// One resting entry on a side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    pub price: Price,
    pub quantity: Quantity,
}

/// One display row: the k-th highest bid entry next to the k-th lowest ask
/// entry. Either cell is `None` once its side runs out of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthRow {
    pub bid: Option<PriceLevel>,
    pub ask: Option<PriceLevel>,
}

/// Render snapshot rows as a fixed-width four-column table with two decimal
/// places, blank cells where a side is exhausted.
pub fn render_depth(rows: &[DepthRow]) -> String {
    let mut out = String::from("Order Book:\n");
    let _ = writeln!(
        out,
        "{:>PRICE_WIDTH$}{:>QUANTITY_WIDTH$}{:>PRICE_WIDTH$}{:>QUANTITY_WIDTH$}",
        "Bid Price", "Bid Quantity", "Ask Price", "Ask Quantity",
    );

    for row in rows {
        push_cell(&mut out, row.bid);
        push_cell(&mut out, row.ask);
        out.push('\n');
    }

    out
}

fn push_cell(out: &mut String, level: Option<PriceLevel>) {
    match level {
        Some(level) => {
            let _ = write!(
                out,
                "{:>PRICE_WIDTH$}{:>QUANTITY_WIDTH$}",
                format!("{:.2}", level.price),
                format!("{:.2}", level.quantity),
            );
        }
        None => {
            let _ = write!(out, "{:>PRICE_WIDTH$}{:>QUANTITY_WIDTH$}", " ", " ");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn level(price_cents: i64, quantity_cents: i64) -> PriceLevel {
        PriceLevel {
            price: Decimal::new(price_cents, 2),
            quantity: Decimal::new(quantity_cents, 2),
        }
    }

    #[test]
    fn test_render_header() {
        let rendered = render_depth(&[]);
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("Order Book:"));
        assert_eq!(
            lines.next(),
            Some(" Bid Price   Bid Quantity Ask Price   Ask Quantity"),
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_render_full_row() {
        let rows = [DepthRow {
            bid: Some(level(15000, 1000)),
            ask: Some(level(15500, 750)),
        }];
        let rendered = render_depth(&rows);
        let row = rendered.lines().nth(2).unwrap();
        assert_eq!(row, "    150.00          10.00    155.00           7.50");
    }

    #[test]
    fn test_render_blank_cells_for_exhausted_side() {
        let rows = [
            DepthRow {
                bid: Some(level(15000, 1000)),
                ask: None,
            },
            DepthRow {
                bid: None,
                ask: Some(level(15500, 750)),
            },
        ];
        let rendered = render_depth(&rows);
        let mut lines = rendered.lines().skip(2);

        let bid_only = lines.next().unwrap();
        assert!(bid_only.starts_with("    150.00          10.00"));
        assert_eq!(bid_only.len(), 2 * (PRICE_WIDTH + QUANTITY_WIDTH));
        assert!(bid_only.ends_with("               "));

        let ask_only = lines.next().unwrap();
        assert!(ask_only.ends_with("    155.00           7.50"));
        assert_eq!(&ask_only[..PRICE_WIDTH + QUANTITY_WIDTH], " ".repeat(25));
    }
}
