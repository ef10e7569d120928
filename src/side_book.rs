//! Side Book (C2): price-ordered map of `PriceLevel`s for one side.
//!
//! `BTreeMap` gives O(log n) lookup/insert/erase and the bidirectional
//! iteration the engine needs (`begin()`/`rbegin()` in the original).

use std::collections::BTreeMap;

use crate::order::Price;
use crate::price_level::PriceLevel;

#[derive(Debug, Clone, Default)]
pub struct SideBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl SideBook {
    pub fn new() -> Self {
        SideBook {
            levels: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    pub fn get_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Get the level at `price`, creating an empty one if absent.
    pub fn get_or_create(&mut self, price: Price) -> &mut PriceLevel {
        self.levels.entry(price).or_insert_with(PriceLevel::new)
    }

    /// Remove the level at `price` if it is now empty (invariant: no empty
    /// level persists).
    pub fn evict_if_empty(&mut self, price: Price) {
        if let Some(level) = self.levels.get(&price) {
            if level.is_empty() {
                self.levels.remove(&price);
            }
        }
    }

    /// Lowest price present (`begin()`).
    pub fn best_low(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// Highest price present (`rbegin()`).
    pub fn best_high(&self) -> Option<Price> {
        self.levels.keys().next_back().copied()
    }

    /// Ascending (lowest-first) iteration.
    pub fn iter_ascending(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().map(|(&p, l)| (p, l))
    }

    /// Descending (highest-first) iteration.
    pub fn iter_descending(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().rev().map(|(&p, l)| (p, l))
    }
}
