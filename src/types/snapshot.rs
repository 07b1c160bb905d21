use crate::types::inventory_item::InventoryItem;

/// The full inventory as last parsed from the server, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    items: Vec<InventoryItem>,
}

impl Snapshot {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.iter()
    }
}

impl From<Vec<InventoryItem>> for Snapshot {
    fn from(items: Vec<InventoryItem>) -> Self {
        Self::new(items)
    }
}
