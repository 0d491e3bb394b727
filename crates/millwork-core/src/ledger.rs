//! Per-node resource ledger.
//!
//! Every quantity a node holds lives here as a bounded [`ResourceStock`].
//! All debits clamp to what is available, so amounts never go negative.

use crate::catalog::ResourceMap;
use crate::fixed::{Fixed64, headroom};
use crate::id::ResourceId;
use std::collections::BTreeMap;

/// A bounded quantity of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceStock {
    pub amount: Fixed64,
    pub maximum: Fixed64,
}

impl ResourceStock {
    pub fn empty(maximum: Fixed64) -> Self {
        Self {
            amount: Fixed64::ZERO,
            maximum,
        }
    }

    /// Room left below the maximum.
    pub fn headroom(&self) -> Fixed64 {
        headroom(self.amount, self.maximum)
    }

    pub fn is_full(&self) -> bool {
        self.amount >= self.maximum
    }
}

/// Resource key -> stock, owned by exactly one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    stocks: BTreeMap<ResourceId, ResourceStock>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource: ResourceId) -> Option<&ResourceStock> {
        self.stocks.get(&resource)
    }

    pub fn contains(&self, resource: ResourceId) -> bool {
        self.stocks.contains_key(&resource)
    }

    /// Held amount, zero when the resource is not tracked.
    pub fn amount(&self, resource: ResourceId) -> Fixed64 {
        self.stocks
            .get(&resource)
            .map_or(Fixed64::ZERO, |stock| stock.amount)
    }

    /// Room left for `resource`, zero when the resource is not tracked.
    pub fn headroom(&self, resource: ResourceId) -> Fixed64 {
        self.stocks
            .get(&resource)
            .map_or(Fixed64::ZERO, ResourceStock::headroom)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &ResourceStock)> {
        self.stocks.iter().map(|(id, stock)| (*id, stock))
    }

    pub fn keys(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.stocks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.stocks.clear();
    }

    /// Replace the tracked set with the keys of `capacities`.
    ///
    /// Existing amounts are clamped to their new maximum; keys absent from
    /// `capacities` are dropped along with whatever they held.
    pub fn recompute(&mut self, capacities: &ResourceMap) {
        self.stocks
            .retain(|resource, _| capacities.contains_key(resource));
        for (resource, maximum) in capacities {
            let stock = self
                .stocks
                .entry(*resource)
                .or_insert_with(|| ResourceStock::empty(*maximum));
            stock.maximum = *maximum;
            stock.amount = stock.amount.min(*maximum);
        }
    }

    /// Overwrite an amount, clamped to `[0, maximum]`. Returns `false` if
    /// the resource is not tracked.
    pub fn set_amount(&mut self, resource: ResourceId, amount: Fixed64) -> bool {
        match self.stocks.get_mut(&resource) {
            Some(stock) => {
                stock.amount = amount.max(Fixed64::ZERO).min(stock.maximum);
                true
            }
            None => false,
        }
    }

    /// Add up to `amount`, never exceeding the maximum. Returns what was
    /// actually added.
    pub fn credit(&mut self, resource: ResourceId, amount: Fixed64) -> Fixed64 {
        let Some(stock) = self.stocks.get_mut(&resource) else {
            return Fixed64::ZERO;
        };
        let added = amount.max(Fixed64::ZERO).min(stock.headroom());
        stock.amount = stock.amount.saturating_add(added);
        added
    }

    /// Remove up to `amount`, never going below zero. Returns what was
    /// actually removed.
    pub fn debit(&mut self, resource: ResourceId, amount: Fixed64) -> Fixed64 {
        let Some(stock) = self.stocks.get_mut(&resource) else {
            return Fixed64::ZERO;
        };
        let removed = amount.max(Fixed64::ZERO).min(stock.amount);
        stock.amount -= removed;
        removed
    }

    /// Withdraw a whole number of units for a downstream neighbor.
    ///
    /// Transfers `floor(min(held, requested))`. An untracked or empty
    /// resource yields zero.
    pub fn pull(&mut self, resource: ResourceId, requested: Fixed64) -> Fixed64 {
        let available = self.amount(resource).min(requested).floor();
        if available <= Fixed64::ZERO {
            return Fixed64::ZERO;
        }
        self.debit(resource, available)
    }

    /// Whether every entry in `costs` is held in at least that quantity.
    pub fn covers(&self, costs: &ResourceMap) -> bool {
        costs
            .iter()
            .all(|(resource, cost)| self.amount(*resource) >= *cost)
    }

    /// Set every tracked stock to its maximum.
    pub fn fill_all(&mut self) {
        for stock in self.stocks.values_mut() {
            stock.amount = stock.maximum;
        }
    }

    /// Zero every tracked stock.
    pub fn empty_all(&mut self) {
        for stock in self.stocks.values_mut() {
            stock.amount = Fixed64::ZERO;
        }
    }
}
