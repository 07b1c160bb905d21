use std::fmt;

use chrono::{DateTime, Utc};

use crate::types::price::Price;

/// Items at or below this stock are flagged as running low.
pub const LOW_STOCK_THRESHOLD: i64 = 3;

#[derive(Clone, PartialEq)]
pub struct InventoryItem {
    category: String,
    name: Option<String>,
    price: Price,
    stock: i64,
    last_updated: Option<DateTime<Utc>>,
}

impl InventoryItem {
    pub fn new(
        category: impl Into<String>,
        name: Option<String>,
        price: Price,
        stock: i64,
        last_updated: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            category: category.into(),
            name,
            price,
            stock,
            last_updated,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// `None` when the server did not name the item.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("—")
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock <= LOW_STOCK_THRESHOLD
    }
}

impl fmt::Debug for InventoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryItem")
            .field("category", &self.category)
            .field("name", &self.display_name())
            .field("price", &format_args!("{}", self.price))
            .field("stock", &self.stock)
            .field("last_updated", &self.last_updated)
            .finish()
    }
}
