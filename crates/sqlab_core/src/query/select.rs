//! Read options shared by the materialized and live-query paths.

use super::filter::Filter;
use super::order::Order;

/// Predicate, ordering and row window for a read.
///
/// Applied as: filter, then ordering keys in listed order, then offset, then
/// limit. `limit = Some(0)` returns no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    pub filter: Option<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate, AND-ed with any predicate already present.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    pub fn order_by(mut self, key: Order) -> Self {
        self.order.push(key);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}
