use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::orderbook::depth::{DepthRow, PriceLevel};
use crate::orderbook::error::InsertError;
use crate::orderbook::types::{Price, Quantity, Side};

/// One side of the book: every quantity resting at each price, in insertion
/// order within the price. Duplicate prices stay as separate entries until
/// [`OrderBook::aggregate`] collapses them.
type Ladder = BTreeMap<Price, Vec<Quantity>>;

#[derive(Debug, Default)]
struct Sides {
    bids: Ladder,
    asks: Ladder,
}

impl Sides {
    fn ladder_mut(&mut self, side: Side) -> &mut Ladder {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    fn ladder(&self, side: Side) -> &Ladder {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }
}

/// Mutex-guarded ledger of bid and ask price levels.
///
/// A single lock covers both sides so that `aggregate` and `snapshot` always
/// observe one consistent state across the whole book. The operational flag
/// lives beside the lock and is read and written atomically without taking it.
///
/// Aggregation is explicit: inserting twice at the same price leaves two
/// entries, and callers that want one entry per price must call
/// [`OrderBook::aggregate`] themselves.
#[derive(Debug)]
pub struct OrderBook {
    sides: Mutex<Sides>,
    operational: AtomicBool,
}

impl OrderBook {
    /// Create an empty book in the operational state.
    pub fn new() -> Self {
        Self {
            sides: Mutex::new(Sides::default()),
            operational: AtomicBool::new(true),
        }
    }

    /// Append a new entry to the given side.
    ///
    /// Inserts with a non-positive price or quantity are logged and dropped;
    /// the caller never sees an error.
    pub fn insert(&self, side: Side, price: Price, quantity: Quantity) {
        if let Err(err) = validate(price, quantity) {
            warn!("dropping {side} insert of {quantity} at {price}: {err}");
            return;
        }

        debug!("inserting {side} entry: {quantity} at {price}");
        let mut sides = self.sides.lock();
        sides.ladder_mut(side).entry(price).or_default().push(quantity);
    }

    /// Collapse each side to one entry per distinct price, summing quantities.
    ///
    /// Bids are processed from the highest price down, asks from the lowest
    /// up; the operation is atomic under the book lock, so only the final
    /// state is observable. Total quantity per price is preserved and no
    /// price disappears.
    pub fn aggregate(&self) {
        let mut sides = self.sides.lock();
        let bids = collapse(sides.bids.iter().rev());
        sides.bids = bids;
        let asks = collapse(sides.asks.iter());
        sides.asks = asks;
    }

    /// Row-aligned view of the book: the k-th highest bid entry paired with
    /// the k-th lowest ask entry, until both sides are exhausted.
    ///
    /// The view reflects the raw entries; if `aggregate` has not run,
    /// duplicate-price rows are visible. Takes the book lock so both sides
    /// come from a single consistent state.
    pub fn snapshot(&self) -> Vec<DepthRow> {
        let sides = self.sides.lock();

        let bids: Vec<PriceLevel> = flatten(sides.bids.iter().rev());
        let asks: Vec<PriceLevel> = flatten(sides.asks.iter());

        (0..bids.len().max(asks.len()))
            .map(|row| DepthRow {
                bid: bids.get(row).copied(),
                ask: asks.get(row).copied(),
            })
            .collect()
    }

    /// Number of entries resting on a side, duplicates included.
    pub fn entry_count(&self, side: Side) -> usize {
        let sides = self.sides.lock();
        sides.ladder(side).values().map(Vec::len).sum()
    }

    /// Whether the dispatch loop should keep serving.
    pub fn is_operational(&self) -> bool {
        self.operational.load(Ordering::Relaxed)
    }

    /// Flip the cooperative shutdown flag. This only affects future loop
    /// iterations; it never interrupts an in-flight readiness wait.
    pub fn set_operational(&self, operational: bool) {
        self.operational.store(operational, Ordering::Relaxed);
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(price: Price, quantity: Quantity) -> Result<(), InsertError> {
    if price <= Price::ZERO {
        return Err(InsertError::InvalidPrice);
    }
    if quantity <= Quantity::ZERO {
        return Err(InsertError::InvalidQuantity);
    }
    Ok(())
}

/// Rebuild a ladder with one summed entry per price, visiting the levels in
/// the given order.
fn collapse<'a>(levels: impl Iterator<Item = (&'a Price, &'a Vec<Quantity>)>) -> Ladder {
    levels
        .map(|(price, quantities)| (*price, vec![quantities.iter().copied().sum()]))
        .collect()
}

/// Flatten a ladder into individual (price, quantity) entries, visiting the
/// levels in the given order.
fn flatten<'a>(levels: impl Iterator<Item = (&'a Price, &'a Vec<Quantity>)>) -> Vec<PriceLevel> {
    levels
        .flat_map(|(price, quantities)| {
            quantities.iter().map(|quantity| PriceLevel {
                price: *price,
                quantity: *quantity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::thread;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn bid_entries(book: &OrderBook) -> Vec<PriceLevel> {
        book.snapshot().iter().filter_map(|row| row.bid).collect()
    }

    fn ask_entries(book: &OrderBook) -> Vec<PriceLevel> {
        book.snapshot().iter().filter_map(|row| row.ask).collect()
    }

    #[test]
    fn test_insert_appends_exact_entry() {
        let book = OrderBook::new();
        book.insert(Side::Bid, dec(15000), dec(1000));

        assert_eq!(book.entry_count(Side::Bid), 1);
        let entries = bid_entries(&book);
        assert_eq!(entries[0].price, dec(15000));
        assert_eq!(entries[0].quantity, dec(1000));

        book.insert(Side::Bid, dec(15000), dec(500));
        assert_eq!(book.entry_count(Side::Bid), 2);
    }

    #[test]
    fn test_invalid_insert_is_a_no_op() {
        let book = OrderBook::new();
        book.insert(Side::Ask, dec(15500), dec(1000));
        let before = book.snapshot();

        book.insert(Side::Ask, dec(0), dec(1000));
        book.insert(Side::Ask, dec(-100), dec(1000));
        book.insert(Side::Ask, dec(15500), dec(0));
        book.insert(Side::Bid, dec(15500), dec(-500));

        assert_eq!(book.snapshot(), before);
        assert_eq!(book.entry_count(Side::Ask), 1);
        assert_eq!(book.entry_count(Side::Bid), 0);
    }

    #[test]
    fn test_duplicates_survive_until_aggregate() {
        let book = OrderBook::new();
        book.insert(Side::Bid, dec(15000), dec(1000));
        book.insert(Side::Bid, dec(15000), dec(250));
        book.insert(Side::Bid, dec(14900), dec(300));

        // Pre-aggregation: duplicate price rows are visible, best price first.
        let entries = bid_entries(&book);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].price, dec(15000));
        assert_eq!(entries[1].price, dec(15000));
        assert_eq!(entries[2].price, dec(14900));

        book.aggregate();

        let entries = bid_entries(&book);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], PriceLevel { price: dec(15000), quantity: dec(1250) });
        assert_eq!(entries[1], PriceLevel { price: dec(14900), quantity: dec(300) });
    }

    #[test]
    fn test_aggregate_preserves_distinct_prices_both_sides() {
        let book = OrderBook::new();
        for cents in [15000, 15100, 15000, 15200] {
            book.insert(Side::Bid, dec(cents), dec(100));
            book.insert(Side::Ask, dec(cents + 500), dec(100));
        }

        book.aggregate();

        assert_eq!(book.entry_count(Side::Bid), 3);
        assert_eq!(book.entry_count(Side::Ask), 3);
        let asks = ask_entries(&book);
        // Asks come back lowest price first.
        assert_eq!(asks[0].price, dec(15500));
        assert_eq!(asks[0].quantity, dec(200));
        assert_eq!(asks[2].price, dec(15700));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let book = OrderBook::new();
        book.insert(Side::Bid, dec(15000), dec(1000));
        book.insert(Side::Bid, dec(15000), dec(500));
        book.insert(Side::Ask, dec(15500), dec(700));

        book.aggregate();
        let once = book.snapshot();
        book.aggregate();
        assert_eq!(book.snapshot(), once);
    }

    #[test]
    fn test_snapshot_pads_shorter_side() {
        let book = OrderBook::new();
        book.insert(Side::Bid, dec(15000), dec(1000));
        book.insert(Side::Bid, dec(14900), dec(1000));
        book.insert(Side::Ask, dec(15500), dec(700));

        let rows = book.snapshot();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].bid.is_some() && rows[0].ask.is_some());
        assert!(rows[1].bid.is_some() && rows[1].ask.is_none());
    }

    #[test]
    fn test_concurrent_inserts_preserve_total_quantity() {
        let book = Arc::new(OrderBook::new());
        let per_thread = 500;

        // Two independent writers, mirroring the dispatch loop and the
        // order generator contending on the book lock.
        let handles: Vec<_> = (0..2)
            .map(|writer| {
                let book = Arc::clone(&book);
                thread::spawn(move || {
                    for i in 0..per_thread {
                        let price = dec(10000 + ((writer * 7 + i) % 50) * 10);
                        book.insert(Side::Bid, price, dec(100));
                        book.insert(Side::Ask, price, dec(100));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(book.entry_count(Side::Bid), 2 * per_thread as usize);
        assert_eq!(book.entry_count(Side::Ask), 2 * per_thread as usize);

        book.aggregate();
        let expected_total = dec(100) * Decimal::from(2 * per_thread);
        let bid_total: Decimal = bid_entries(&book).iter().map(|e| e.quantity).sum();
        let ask_total: Decimal = ask_entries(&book).iter().map(|e| e.quantity).sum();
        assert_eq!(bid_total, expected_total);
        assert_eq!(ask_total, expected_total);
    }

    #[test]
    fn test_operational_flag() {
        let book = OrderBook::new();
        assert!(book.is_operational());
        book.set_operational(false);
        assert!(!book.is_operational());
    }

    proptest! {
        #[test]
        fn aggregate_preserves_per_price_totals(
            entries in proptest::collection::vec((1i64..10_000, 1i64..10_000), 1..64)
        ) {
            let book = OrderBook::new();
            let mut expected: BTreeMap<Price, Quantity> = BTreeMap::new();
            for (price_cents, quantity_cents) in entries {
                let price = dec(price_cents);
                let quantity = dec(quantity_cents);
                book.insert(Side::Bid, price, quantity);
                *expected.entry(price).or_default() += quantity;
            }

            book.aggregate();

            let bids = bid_entries(&book);
            prop_assert_eq!(bids.len(), expected.len());
            for level in bids {
                prop_assert_eq!(expected.get(&level.price).copied(), Some(level.quantity));
            }
        }
    }
}
