use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sellgrid_shared::Variant;
use uuid::Uuid;

/// A pending line item. `unit_price` is the price at add time; the checkout
/// workflow flags drift against the live catalog before any order is placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: i64,
    pub line_total: i64,
    pub variant: Variant,
    pub added_at: DateTime<Utc>,
}

/// One cart per user. `total_items` and `total_amount` are caches of the
/// line items and must always equal what `recalculate` would produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub total_items: u32,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            total_items: 0,
            total_amount: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merge into an existing line (same product and variant) or append a
    /// new one. A line always holds at least one unit; zero quantities are
    /// ignored. Stock is not checked here; it is only authoritative at
    /// reservation time.
    pub fn add_item(&mut self, product_id: Uuid, quantity: u32, unit_price: i64, variant: Variant) {
        if quantity == 0 {
            return;
        }
        match self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id && i.variant == variant)
        {
            Some(existing) => {
                existing.quantity += quantity;
                existing.unit_price = unit_price;
            }
            None => self.items.push(CartItem {
                product_id,
                quantity,
                unit_price,
                line_total: 0,
                variant,
                added_at: Utc::now(),
            }),
        }
        self.recalculate();
    }

    /// Set a line's quantity; zero (or below, for callers using signed
    /// input) removes the line.
    pub fn update_item_quantity(&mut self, product_id: Uuid, quantity: u32) -> Result<(), CartError> {
        if !self.items.iter().any(|i| i.product_id == product_id) {
            return Err(CartError::ItemNotFound(product_id));
        }

        if quantity == 0 {
            self.items.retain(|i| i.product_id != product_id);
        } else {
            for item in self.items.iter_mut().filter(|i| i.product_id == product_id) {
                item.quantity = quantity;
            }
        }
        self.recalculate();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: Uuid) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound(product_id));
        }
        self.recalculate();
        Ok(())
    }

    /// Empty the cart, zeroing totals. The cart record itself survives;
    /// checkout clears rather than deletes.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recalculate();
    }

    /// A cart with items that has seen no activity for the configured window
    /// is a candidate for recovery campaigns.
    pub fn is_abandoned(&self, now: DateTime<Utc>, window_minutes: i64) -> bool {
        !self.items.is_empty() && now - self.updated_at > Duration::minutes(window_minutes)
    }

    fn recalculate(&mut self) {
        for item in &mut self.items {
            item.line_total = item.unit_price * i64::from(item.quantity);
        }
        self.total_items = self.items.iter().map(|i| i.quantity).sum();
        self.total_amount = self.items.iter().map(|i| i.line_total).sum();
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Item not found in cart: {0}")]
    ItemNotFound(Uuid),
}
