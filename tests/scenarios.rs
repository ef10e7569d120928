//! Integration tests driving the public library API the way `main.rs`
//! does: parse a line, hand valid messages to the engine, observe the
//! logger's emitted text, end-to-end rather than through engine
//! internals.

use std::io::Write;
use std::sync::{Arc, Mutex};

use lob_feed_handler::logger::AsyncLogger;
use lob_feed_handler::parser::parse_line;
use lob_feed_handler::{BookEngine, ErrorCounters};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct Tape {
    engine: BookEngine,
    counters: ErrorCounters,
    logger: AsyncLogger,
    buf: SharedBuf,
}

impl Tape {
    fn new() -> Self {
        let buf = SharedBuf::default();
        Tape {
            engine: BookEngine::new(),
            counters: ErrorCounters::new(),
            logger: AsyncLogger::start_writing_to(buf.clone()),
            buf,
        }
    }

    fn feed_all(&mut self, lines: &[&str]) {
        for line in lines {
            if let Some(message) = parse_line(line, &mut self.counters) {
                self.engine.process(message, &mut self.counters, &self.logger);
            }
        }
    }

    fn drain(mut self) -> String {
        self.logger.stop();
        let bytes = self.buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }
}

#[test]
fn single_add_then_cancel_is_always_nan() {
    let mut tape = Tape::new();
    tape.feed_all(&["A,1,B,10,100.00", "X,1"]);
    assert_eq!(tape.counters.good_messages, 2);
    let out = tape.drain();
    assert_eq!(out.lines().filter(|l| *l == "NAN").count(), 2);
}

#[test]
fn cross_emission_increments_once_and_prints_midpoint() {
    let mut tape = Tape::new();
    tape.feed_all(&["A,1,B,10,101.00", "A,2,S,10,100.00"]);
    assert_eq!(tape.counters.crossed_book, 1);
    let out = tape.drain();
    assert!(out.lines().any(|l| l == "100.50"));
}

#[test]
fn trade_consumes_oldest_order_on_each_side() {
    let mut tape = Tape::new();
    tape.feed_all(&[
        "A,1,B,5,100.00",
        "A,2,B,5,100.00",
        "A,3,S,5,100.00",
        "T,5,100.00",
    ]);
    assert_eq!(tape.counters.trade_missing_orders, 0);
    let out = tape.drain();
    assert!(out.lines().any(|l| l == "5@100.00"));
}

#[test]
fn modify_retains_priority_on_quantity_reduction() {
    // A resting sell is added so the trade has a counterparty to match
    // (a trade's preconditions require a sell level at the exact trade
    // price before any matching happens).
    let mut tape = Tape::new();
    tape.feed_all(&[
        "A,1,B,10,100.00",
        "A,2,B,5,100.00",
        "M,1,B,5,100.00",
        "A,3,S,5,100.00",
        "T,5,100.00",
    ]);
    let out = tape.drain();
    assert!(out.lines().any(|l| l == "5@100.00"));
}

#[test]
fn modify_forfeits_priority_on_quantity_increase() {
    let mut tape = Tape::new();
    tape.feed_all(&[
        "A,1,B,5,100.00",
        "A,2,B,5,100.00",
        "M,1,B,6,100.00",
        "A,3,S,5,100.00",
        "T,5,100.00",
    ]);
    let out = tape.drain();
    assert!(out.lines().any(|l| l == "5@100.00"));
}

#[test]
fn trade_aggregates_across_identical_prices() {
    let mut tape = Tape::new();
    tape.feed_all(&[
        "A,1,B,10,100.00",
        "A,2,S,10,100.00",
        "T,4,100.00",
        "T,3,100.00",
    ]);
    let out = tape.drain();
    let trade_lines: Vec<&str> = out.lines().filter(|l| l.contains('@')).collect();
    assert_eq!(trade_lines, vec!["4@100.00", "7@100.00"]);
}

#[test]
fn trade_above_every_resting_sell_is_rejected_and_book_unchanged() {
    let mut tape = Tape::new();
    tape.feed_all(&["A,1,B,10,100.00", "A,2,S,10,101.00", "T,10,102.00"]);
    assert_eq!(tape.counters.trade_missing_orders, 1);
    let out = tape.drain();
    // rejected trade mutates nothing; midpoint after it is identical to
    // the midpoint after the second add.
    assert_eq!(out.lines().filter(|l| *l == "100.50").count(), 2);
}

#[test]
fn boundary_prices_and_quantities() {
    let mut counters = ErrorCounters::new();
    assert!(parse_line("A,1,B,10,0.01", &mut counters).is_some());
    assert!(parse_line("A,2,B,10,0.00", &mut counters).is_none());
    assert!(parse_line("A,3,B,10,0.001", &mut counters).is_none());
    assert!(parse_line("A,4,B,10,-1.00", &mut counters).is_none());
    assert!(parse_line("A,5,B,0,1.00", &mut counters).is_none());
    assert_eq!(counters.good_messages, 1);
    assert_eq!(counters.invalid_price, 3);
    assert_eq!(counters.invalid_qty, 1);
}

#[test]
fn duplicate_add_leaves_original_resting() {
    let mut tape = Tape::new();
    tape.feed_all(&["A,1,B,10,100.00", "A,1,B,99,50.00", "X,1"]);
    assert_eq!(tape.counters.duplicate_add, 1);
    assert_eq!(tape.counters.bad_cancels, 0);
}

#[test]
fn periodic_book_snapshot_can_be_requested_explicitly() {
    let mut tape = Tape::new();
    tape.feed_all(&["A,1,B,10,99.00", "A,2,S,5,101.00"]);
    tape.engine.print_book(&tape.logger);
    let out = tape.drain();
    assert!(out.contains("101.00"));
    assert!(out.contains("99.00"));
}
