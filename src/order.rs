//! Order identity and the resting-order value type.

/// Upper bound on price (cents): `$100,000.00`. Prices must satisfy
/// `0 < price < MAX_PRICE`.
pub const MAX_PRICE: u64 = 10_000_000;

/// Unique identifier for a resting order. Matches the wire format's
/// 32-bit unsigned id, widened to avoid repeated casts at call sites.
pub type OrderId = u32;

/// Cent-fixed-point price: an integer equal to `round(price * 100)`.
pub type Price = u64;

/// Resting (or trade) quantity.
pub type Quantity = u32;

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Classify a side token. Only `B` and `S` are valid; anything else is
    /// a parser-level validation failure, never represented here.
    pub fn from_token(byte: u8) -> Option<Side> {
        match byte {
            b'B' => Some(Side::Buy),
            b'S' => Some(Side::Sell),
            _ => None,
        }
    }
}

/// A resting limit order: immutable identity, mutable quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

impl Order {
    pub fn new(id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Order {
            id,
            side,
            price,
            quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_from_token() {
        assert_eq!(Side::from_token(b'B'), Some(Side::Buy));
        assert_eq!(Side::from_token(b'S'), Some(Side::Sell));
        assert_eq!(Side::from_token(b'Z'), None);
    }
}
