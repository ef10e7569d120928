//! The state machine at the heart of the feed handler: owns both
//! `SideBook`s and the shared `OrderIndex`, and exposes
//! `add_order`/`modify_order`/`remove_order`/`handle_trade`/`print_book`/
//! `print_midpoint`.
//!
//! A message reaching the engine always gets a midpoint print afterward,
//! whether or not the engine actually accepted it — a duplicate add still
//! gets one, since "reached the engine" only requires a successful parse.

use crate::error_counters::{ErrorCounter, ErrorCounters};
use crate::logger::AsyncLogger;
use crate::order::{Order, OrderId, Price, Quantity, Side};
use crate::order_index::OrderIndex;
use crate::parser::{ParsedMessage, TradeRecord};
use crate::side_book::SideBook;

#[derive(Debug, Default)]
pub struct BookEngine {
    buy: SideBook,
    sell: SideBook,
    index: OrderIndex,
    recent_trade_price: Option<Price>,
    recent_trade_qty: Quantity,
}

impl BookEngine {
    pub fn new() -> Self {
        BookEngine::default()
    }

    fn side_book_mut(&mut self, side: Side) -> &mut SideBook {
        match side {
            Side::Buy => &mut self.buy,
            Side::Sell => &mut self.sell,
        }
    }

    /// Dispatch one already-parsed message and emit the post-message
    /// midpoint (see module docs).
    pub fn process(&mut self, message: ParsedMessage, counters: &mut ErrorCounters, logger: &AsyncLogger) {
        match message {
            ParsedMessage::Add(order) => self.add_order(order, counters, logger),
            ParsedMessage::Modify(new_order) => self.modify_order(new_order, counters, logger),
            ParsedMessage::Remove(id) => self.remove_order(id, counters, logger),
            ParsedMessage::Trade(trade) => self.handle_trade(trade, counters, logger),
        }
        self.print_midpoint(logger);
    }

    /// `check_cross` runs after the insertion rather than before it: an ADD
    /// is exactly the operation that can newly cross a book that was not
    /// crossed a moment ago, and the crossed-book accounting needs to
    /// observe that. A duplicate add mutates nothing, so nothing to
    /// re-check on that path.
    pub fn add_order(&mut self, order: Order, counters: &mut ErrorCounters, _logger: &AsyncLogger) {
        if self.index.contains(order.id) {
            counters.increment(ErrorCounter::DuplicateAdd);
            return;
        }

        let level = self.side_book_mut(order.side).get_or_create(order.price);
        level.push_front(order.id, order.quantity);
        self.index.insert(order);

        self.check_cross(counters);
    }

    /// As with `add_order`, `check_cross` runs after the mutation: a price
    /// change or quantity increase can newly cross the book, and a bad
    /// modify (unknown id) mutates nothing worth re-checking.
    pub fn modify_order(&mut self, new_order: Order, counters: &mut ErrorCounters, _logger: &AsyncLogger) {
        let existing = match self.index.get(new_order.id) {
            Some(o) => *o,
            None => {
                counters.increment(ErrorCounter::BadModifies);
                return;
            }
        };

        if new_order.price == existing.price {
            if new_order.quantity <= existing.quantity {
                // Quantity reduction retains time priority: mutate in place.
                let level = self
                    .side_book_mut(existing.side)
                    .get_mut(existing.price)
                    .expect("order indexed implies its level exists");
                level.change_quantity(existing.quantity, new_order.quantity);
                self.index
                    .get_mut(existing.id)
                    .expect("looked up above")
                    .quantity = new_order.quantity;
            } else {
                // Quantity increase forfeits priority: re-insert at HEAD.
                let level = self
                    .side_book_mut(existing.side)
                    .get_mut(existing.price)
                    .expect("order indexed implies its level exists");
                level.remove(existing.id, existing.quantity);
                level.push_front(existing.id, new_order.quantity);
                self.index.insert(Order::new(
                    existing.id,
                    existing.side,
                    existing.price,
                    new_order.quantity,
                ));
            }
        } else {
            // Price changed: leave the old level, land at HEAD of the new one.
            let old_level = self
                .side_book_mut(existing.side)
                .get_mut(existing.price)
                .expect("order indexed implies its level exists");
            old_level.remove(existing.id, existing.quantity);
            self.side_book_mut(existing.side).evict_if_empty(existing.price);

            let new_level = self.side_book_mut(existing.side).get_or_create(new_order.price);
            new_level.push_front(existing.id, new_order.quantity);
            self.index.insert(Order::new(
                existing.id,
                existing.side,
                new_order.price,
                new_order.quantity,
            ));
        }
        self.check_cross(counters);
    }

    pub fn remove_order(&mut self, id: OrderId, counters: &mut ErrorCounters, logger: &AsyncLogger) {
        self.check_cross(counters);

        let existing = match self.index.get(id) {
            Some(o) => *o,
            None => {
                counters.increment(ErrorCounter::BadCancels);
                return;
            }
        };

        match self.side_book_mut(existing.side).get_mut(existing.price) {
            Some(level) => {
                level.remove(id, existing.quantity);
                self.index.remove(id);
                self.side_book_mut(existing.side).evict_if_empty(existing.price);
            }
            None => {
                // Invariant violation: indexed but no enclosing level.
                logger.print(format!(
                    "CATASTROPHIC: order {id} present in index but absent from its price level\n"
                ));
            }
        }
    }

    pub fn handle_trade(&mut self, trade: TradeRecord, counters: &mut ErrorCounters, logger: &AsyncLogger) {
        if self.buy.is_empty() || self.sell.is_empty() {
            counters.increment(ErrorCounter::TradeMissingOrders);
            return;
        }

        let buy_price = self.buy.best_high().expect("non-empty checked above");
        if buy_price < trade.price {
            counters.increment(ErrorCounter::TradeMissingOrders);
            return;
        }

        let sell_level_qty = match self.sell.get(trade.price) {
            Some(level) => level.total_quantity(),
            None => {
                counters.increment(ErrorCounter::TradeMissingOrders);
                return;
            }
        };

        let buy_level_qty = self
            .buy
            .get(buy_price)
            .expect("best_high price must have a level")
            .total_quantity();

        if buy_level_qty < trade.quantity || sell_level_qty < trade.quantity {
            counters.increment(ErrorCounter::TradeMissingOrders);
            return;
        }

        Self::consume_from_tail(&mut self.buy, &mut self.index, buy_price, trade.quantity);
        Self::consume_from_tail(&mut self.sell, &mut self.index, trade.price, trade.quantity);

        match self.recent_trade_price {
            Some(price) if price == trade.price => {
                self.recent_trade_qty += trade.quantity;
            }
            _ => {
                self.recent_trade_price = Some(trade.price);
                self.recent_trade_qty = trade.quantity;
            }
        }
        logger.print(format!(
            "{}@{:.2}\n",
            self.recent_trade_qty,
            self.recent_trade_price.unwrap() as f64 / 100.0
        ));

        self.check_cross(counters);
    }

    /// Consume `remaining` units from `price`'s level, oldest order first,
    /// comparing the *remaining* trade quantity against each TAIL order's
    /// *current* quantity at every step.
    fn consume_from_tail(side: &mut SideBook, index: &mut OrderIndex, price: Price, mut remaining: Quantity) {
        while remaining > 0 {
            let level = side.get_mut(price).expect("precondition-checked level");
            let tail_id = level.tail().expect("precondition-checked quantity");
            let tail_order = index.get_mut(tail_id).expect("every resting id is indexed");

            if tail_order.quantity > remaining {
                let old_qty = tail_order.quantity;
                tail_order.quantity -= remaining;
                level.change_quantity(old_qty, tail_order.quantity);
                remaining = 0;
            } else {
                let consumed = tail_order.quantity;
                level.pop_tail(consumed);
                index.remove(tail_id);
                remaining -= consumed;
            }
        }
        side.evict_if_empty(price);
    }

    pub fn print_midpoint(&self, logger: &AsyncLogger) {
        if self.buy.is_empty() || self.sell.is_empty() {
            logger.print("NAN\n");
            return;
        }
        let sell_min = self.sell.best_low().expect("checked non-empty");
        let buy_max = self.buy.best_high().expect("checked non-empty");
        let midpoint = (sell_min + buy_max) as f64 / 200.0;
        logger.print(format!("{midpoint:.2}\n"));
    }

    /// Observational only; never repairs a crossed book.
    pub fn check_cross(&mut self, counters: &mut ErrorCounters) {
        if self.buy.is_empty() || self.sell.is_empty() {
            return;
        }
        let sell_min = self.sell.best_low().expect("checked non-empty");
        let buy_max = self.buy.best_high().expect("checked non-empty");
        if sell_min <= buy_max {
            counters.increment(ErrorCounter::CrossedBook);
        }
    }

    pub fn print_book(&self, logger: &AsyncLogger) {
        let mut out = String::new();
        for (price, level) in self.sell.iter_descending() {
            if level.is_empty() {
                continue;
            }
            out.push_str(&format!("{:.2} ", price as f64 / 100.0));
            self.append_level(&mut out, 'S', level);
            out.push('\n');
        }
        out.push('\n');
        for (price, level) in self.buy.iter_descending() {
            if level.is_empty() {
                continue;
            }
            out.push_str(&format!("{:.2} ", price as f64 / 100.0));
            self.append_level(&mut out, 'B', level);
            out.push('\n');
        }
        logger.print(out);
    }

    fn append_level(&self, out: &mut String, tag: char, level: &crate::price_level::PriceLevel) {
        for order_id in level.iter_tail_to_head() {
            let qty = self.index.get(order_id).map(|o| o.quantity).unwrap_or(0);
            out.push_str(&format!("{tag} {qty} "));
        }
    }

    #[cfg(test)]
    pub(crate) fn buy_side(&self) -> &SideBook {
        &self.buy
    }

    #[cfg(test)]
    pub(crate) fn sell_side(&self) -> &SideBook {
        &self.sell
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &OrderIndex {
        &self.index
    }
}
