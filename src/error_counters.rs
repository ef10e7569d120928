//! Monotonically increasing named counters plus a fixed-width shutdown
//! summary.
//!
//! Owned by the caller (`main`) and threaded through as an explicit
//! dependency — no process-global singleton, and no locking, since the
//! engine's hot path is single-threaded.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCounter {
    CorruptMessages,
    GoodMessages,
    DuplicateAdd,
    TradeMissingOrders,
    BadCancels,
    BadModifies,
    CrossedBook,
    InvalidQty,
    InvalidPrice,
    InvalidId,
}

#[derive(Debug, Clone, Default)]
pub struct ErrorCounters {
    pub corrupt_messages: u32,
    pub good_messages: u32,
    pub duplicate_add: u32,
    pub trade_missing_orders: u32,
    pub bad_cancels: u32,
    pub bad_modifies: u32,
    pub crossed_book: u32,
    pub invalid_qty: u32,
    pub invalid_price: u32,
    pub invalid_id: u32,
}

impl ErrorCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, counter: ErrorCounter) {
        let field = match counter {
            ErrorCounter::CorruptMessages => &mut self.corrupt_messages,
            ErrorCounter::GoodMessages => &mut self.good_messages,
            ErrorCounter::DuplicateAdd => &mut self.duplicate_add,
            ErrorCounter::TradeMissingOrders => &mut self.trade_missing_orders,
            ErrorCounter::BadCancels => &mut self.bad_cancels,
            ErrorCounter::BadModifies => &mut self.bad_modifies,
            ErrorCounter::CrossedBook => &mut self.crossed_book,
            ErrorCounter::InvalidQty => &mut self.invalid_qty,
            ErrorCounter::InvalidPrice => &mut self.invalid_price,
            ErrorCounter::InvalidId => &mut self.invalid_id,
        };
        *field += 1;
    }

    /// Render the fixed-column summary used at shutdown, matching the
    /// original's `"%-30s %10u\n"` layout.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n[Feed Handler Statistics]");
        let mut line = |label: &str, value: u32| {
            let _ = writeln!(out, "   {:<30} {:>10}", label, value);
        };
        line("Corrupt Messages:", self.corrupt_messages);
        line("Good Messages:", self.good_messages);
        line("Duplicate Adds:", self.duplicate_add);
        line("Trades Missing Orders:", self.trade_missing_orders);
        line("Cancels for Missing ID's:", self.bad_cancels);
        line("Modifies for Missing ID's:", self.bad_modifies);
        line("Crossed Book:", self.crossed_book);
        line("Invalid Quantities:", self.invalid_qty);
        line("Invalid Prices:", self.invalid_price);
        line("Invalid IDs:", self.invalid_id);
        out
    }
}
