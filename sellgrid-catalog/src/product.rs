use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Core catalog entry. `stock` is the single source of truth for
/// availability and is only ever mutated through the stock ledger's
/// reserve/release operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub title: String,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    /// Unit price in minor currency units.
    pub unit_price: i64,
    pub stock: i64,
    pub low_stock_threshold: i64,
    pub is_active: bool,
    pub last_stock_update: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(sku: impl Into<String>, title: impl Into<String>, unit_price: i64, stock: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sku: sku.into(),
            title: title.into(),
            brand: None,
            image_url: None,
            unit_price,
            stock,
            low_stock_threshold: 5,
            is_active: true,
            last_stock_update: now,
            created_at: now,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }

    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}
