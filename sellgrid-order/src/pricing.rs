use serde::{Deserialize, Serialize};

/// Business rules for checkout pricing and the order lifecycle windows.
/// Loaded from config in production; defaults match the standard storefront
/// setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRules {
    /// Orders at or above this subtotal ship free.
    pub free_shipping_threshold: i64,
    pub base_shipping_fee: i64,
    /// Added per item beyond the first.
    pub per_item_surcharge: i64,
    pub max_shipping_fee: i64,
    /// Flat tax as a fraction of subtotal, e.g. 0.18.
    pub tax_rate: f64,
    pub return_window_days: i64,
    pub cart_abandonment_minutes: i64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 999,
            base_shipping_fee: 99,
            per_item_surcharge: 10,
            max_shipping_fee: 299,
            tax_rate: 0.18,
            return_window_days: 30,
            cart_abandonment_minutes: 60 * 24,
        }
    }
}

impl PricingRules {
    /// Free above the threshold; otherwise base fee plus a per-item
    /// surcharge for every item after the first, capped.
    pub fn shipping_cost(&self, subtotal: i64, item_count: u32) -> i64 {
        if subtotal >= self.free_shipping_threshold {
            return 0;
        }
        let extra_items = i64::from(item_count.saturating_sub(1));
        let fee = self.base_shipping_fee + self.per_item_surcharge * extra_items;
        fee.min(self.max_shipping_fee)
    }

    /// Flat percentage of subtotal, rounded to the nearest minor unit.
    pub fn tax_amount(&self, subtotal: i64) -> i64 {
        (subtotal as f64 * self.tax_rate).round() as i64
    }
}
