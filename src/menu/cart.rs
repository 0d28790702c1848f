//! Cart contents for one meal slot

use super::{MenuItem, Money};

/// Items added for the slot currently being processed.
///
/// Owned by one checkout run and dropped afterwards; never carried across slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    items: Vec<MenuItem>,
    subtotal_pretax: Money,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal_pretax
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|i| i.id == item_id)
    }

    pub fn has_main(&self) -> bool {
        self.items.iter().any(|i| i.category.is_main())
    }

    /// Record an item the site confirmed as added
    pub fn add(&mut self, item: MenuItem) {
        self.subtotal_pretax += item.pretax_price;
        self.items.push(item);
    }

    pub fn item_names(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.name.as_str()).collect()
    }
}
