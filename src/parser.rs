//! Classify a text line and decode its fields with strict validation,
//! bumping exactly one error counter per failure.
//!
//! Grammar: comma-separated ASCII, no whitespace, LF terminated (the
//! line-splitting itself is the driving loop's job — see `main.rs`).
//! A line is rejected outright if empty or over 1024 bytes; nothing else
//! length-wise is enforced.

use crate::error_counters::{ErrorCounter, ErrorCounters};
use crate::order::{Order, OrderId, Price, Quantity, Side, MAX_PRICE};

pub const MESSAGE_LEN_MAX: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeRecord {
    pub price: Price,
    pub quantity: Quantity,
}

/// A successfully parsed, validated message. An `Order` inside `Add` is a
/// brand-new resting order; inside `Modify` it carries the *new* price and
/// quantity under the *existing* order's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedMessage {
    Add(Order),
    Modify(Order),
    Remove(OrderId),
    Trade(TradeRecord),
}

enum MessageKind {
    Add,
    Modify,
    Remove,
    Trade,
    Unknown,
}

fn classify(line: &str) -> MessageKind {
    match line.as_bytes().first() {
        Some(b'A') => MessageKind::Add,
        Some(b'M') => MessageKind::Modify,
        Some(b'X') => MessageKind::Remove,
        Some(b'T') => MessageKind::Trade,
        _ => MessageKind::Unknown,
    }
}

/// Parse and validate one line, incrementing exactly one counter. Returns
/// `None` for any failure (the message never reaches the engine) and
/// `Some(message)` on success (`good_messages` already incremented).
pub fn parse_line(line: &str, counters: &mut ErrorCounters) -> Option<ParsedMessage> {
    if line.is_empty() || line.len() > MESSAGE_LEN_MAX {
        counters.increment(ErrorCounter::CorruptMessages);
        return None;
    }

    match classify(line) {
        MessageKind::Add => parse_order_fields(line, counters).map(ParsedMessage::Add),
        MessageKind::Modify => parse_order_fields(line, counters).map(ParsedMessage::Modify),
        MessageKind::Remove => parse_remove_fields(line, counters).map(ParsedMessage::Remove),
        MessageKind::Trade => parse_trade_fields(line, counters).map(ParsedMessage::Trade),
        MessageKind::Unknown => {
            counters.increment(ErrorCounter::CorruptMessages);
            None
        }
    }
}

/// `<A|M>,<id>,<B|S>,<qty>,<price>` — shared by Add/Modify.
fn parse_order_fields(line: &str, counters: &mut ErrorCounters) -> Option<Order> {
    let mut tokens = line.split(',');
    tokens.next(); // message-type token, already classified

    let id = match parse_uint_token(tokens.next()) {
        Ok(v) => v,
        Err(TokenError::Missing) => {
            counters.increment(ErrorCounter::CorruptMessages);
            return None;
        }
        Err(TokenError::Invalid) => {
            counters.increment(ErrorCounter::InvalidId);
            return None;
        }
    };

    let side = match tokens.next() {
        None => {
            counters.increment(ErrorCounter::CorruptMessages);
            return None;
        }
        Some(tok) => match tok.as_bytes() {
            [byte] => match Side::from_token(*byte) {
                Some(side) => side,
                None => {
                    counters.increment(ErrorCounter::CorruptMessages);
                    return None;
                }
            },
            _ => {
                counters.increment(ErrorCounter::CorruptMessages);
                return None;
            }
        },
    };

    let quantity = match parse_uint_token(tokens.next()) {
        Ok(v) => v,
        Err(TokenError::Missing) => {
            counters.increment(ErrorCounter::CorruptMessages);
            return None;
        }
        Err(TokenError::Invalid) => {
            counters.increment(ErrorCounter::InvalidQty);
            return None;
        }
    };
    if quantity == 0 {
        counters.increment(ErrorCounter::InvalidQty);
        return None;
    }

    let price_token = tokens.next();
    let price = match parse_price_token(price_token) {
        Ok(v) => v,
        Err(TokenError::Missing) => {
            counters.increment(ErrorCounter::CorruptMessages);
            return None;
        }
        Err(TokenError::Invalid) => {
            counters.increment(ErrorCounter::InvalidPrice);
            return None;
        }
    };
    if price == 0 || price >= MAX_PRICE {
        counters.increment(ErrorCounter::InvalidPrice);
        return None;
    }

    counters.increment(ErrorCounter::GoodMessages);
    Some(Order::new(id, side, price, quantity))
}

/// `X,<id>` — a cancel carries only the id of the order it targets.
fn parse_remove_fields(line: &str, counters: &mut ErrorCounters) -> Option<OrderId> {
    let mut tokens = line.split(',');
    tokens.next(); // 'X', already classified

    let id = match parse_uint_token(tokens.next()) {
        Ok(v) => v,
        Err(TokenError::Missing) => {
            counters.increment(ErrorCounter::CorruptMessages);
            return None;
        }
        Err(TokenError::Invalid) => {
            counters.increment(ErrorCounter::InvalidId);
            return None;
        }
    };

    counters.increment(ErrorCounter::GoodMessages);
    Some(id)
}

/// `T,<qty>,<price>`.
fn parse_trade_fields(line: &str, counters: &mut ErrorCounters) -> Option<TradeRecord> {
    let mut tokens = line.split(',');
    tokens.next(); // 'T', already classified

    let quantity = match parse_uint_token(tokens.next()) {
        Ok(v) => v,
        Err(TokenError::Missing) => {
            counters.increment(ErrorCounter::CorruptMessages);
            return None;
        }
        Err(TokenError::Invalid) => {
            counters.increment(ErrorCounter::InvalidQty);
            return None;
        }
    };
    // A zero trade quantity is reported as `invalid_price`, not
    // `invalid_qty` — reproduced bug-for-bug from the source tape format.
    if quantity == 0 {
        counters.increment(ErrorCounter::InvalidPrice);
        return None;
    }

    let price = match parse_price_token(tokens.next()) {
        Ok(v) => v,
        Err(TokenError::Missing) => {
            counters.increment(ErrorCounter::CorruptMessages);
            return None;
        }
        Err(TokenError::Invalid) => {
            counters.increment(ErrorCounter::InvalidPrice);
            return None;
        }
    };
    if price == 0 || price >= MAX_PRICE {
        counters.increment(ErrorCounter::InvalidPrice);
        return None;
    }

    counters.increment(ErrorCounter::GoodMessages);
    Some(TradeRecord { price, quantity })
}

enum TokenError {
    Missing,
    Invalid,
}

fn parse_uint_token(token: Option<&str>) -> Result<u32, TokenError> {
    let token = token.ok_or(TokenError::Missing)?;
    token.parse::<u32>().map_err(|_| TokenError::Invalid)
}

/// Parse a `fixed-2` price token into cent-fixed-point, rejecting negative
/// values, non-numeric tokens, and anything with more than two decimal
/// digits of precision. A double is used as the transport representation,
/// tolerating only floating-point round-off noise.
fn parse_price_token(token: Option<&str>) -> Result<Price, TokenError> {
    let token = token.ok_or(TokenError::Missing)?;
    if token.starts_with('-') {
        return Err(TokenError::Invalid);
    }
    let raw: f64 = token.parse().map_err(|_| TokenError::Invalid)?;
    let scaled = raw * 100.0;
    let rounded = scaled.round();
    if (scaled - rounded).abs() > 1e-6 {
        return Err(TokenError::Invalid);
    }
    if rounded < 0.0 {
        return Err(TokenError::Invalid);
    }
    Ok(rounded as Price)
}
