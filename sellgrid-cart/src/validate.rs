use serde::{Deserialize, Serialize};
use sellgrid_catalog::Product;
use std::collections::HashMap;
use uuid::Uuid;

use crate::cart::Cart;

/// Correction a caller should apply to a cart line before checkout can
/// proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueAction {
    /// Product is gone or inactive; drop the line.
    Remove,
    /// Not enough stock; cap the line at what is available.
    UpdateQuantity { available: i64 },
    /// Catalog price moved since the item was added.
    UpdatePrice { old_price: i64, new_price: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartIssue {
    pub product_id: Uuid,
    pub action: IssueAction,
}

impl Cart {
    /// Check every line against the live catalog and report what is stale.
    /// Pure read: the cart is not mutated, so callers can reject, auto-fix,
    /// or surface the list. Stock can still change between this check and
    /// reservation; the ledger's conditional decrement is the final word.
    pub fn validate_items(&self, products: &HashMap<Uuid, Product>) -> Vec<CartIssue> {
        let mut issues = Vec::new();

        for item in &self.items {
            // Lines must carry at least one unit; anything else would fail
            // deep inside reservation instead of here
            if item.quantity == 0 {
                issues.push(CartIssue {
                    product_id: item.product_id,
                    action: IssueAction::Remove,
                });
                continue;
            }

            let product = match products.get(&item.product_id) {
                Some(p) => p,
                None => {
                    issues.push(CartIssue {
                        product_id: item.product_id,
                        action: IssueAction::Remove,
                    });
                    continue;
                }
            };

            if !product.is_active {
                issues.push(CartIssue {
                    product_id: item.product_id,
                    action: IssueAction::Remove,
                });
                continue;
            }

            if !product.has_stock(i64::from(item.quantity)) {
                issues.push(CartIssue {
                    product_id: item.product_id,
                    action: IssueAction::UpdateQuantity {
                        available: product.stock,
                    },
                });
                continue;
            }

            if product.unit_price != item.unit_price {
                issues.push(CartIssue {
                    product_id: item.product_id,
                    action: IssueAction::UpdatePrice {
                        old_price: item.unit_price,
                        new_price: product.unit_price,
                    },
                });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sellgrid_shared::Variant;

    fn catalog(products: Vec<Product>) -> HashMap<Uuid, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn clean_cart_returns_no_issues() {
        let product = Product::new("SKU-A", "Widget", 100, 5);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add_item(product.id, 2, 100, Variant::default());

        assert!(cart.validate_items(&catalog(vec![product])).is_empty());
    }

    #[test]
    fn out_of_stock_line_gets_quantity_flag() {
        // 2 units of A (stock 5) and 1 unit of B (stock 0)
        let a = Product::new("SKU-A", "Widget", 100, 5);
        let b = Product::new("SKU-B", "Gadget", 200, 0);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add_item(a.id, 2, 100, Variant::default());
        cart.add_item(b.id, 1, 200, Variant::default());
        let b_id = b.id;

        let issues = cart.validate_items(&catalog(vec![a, b]));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].product_id, b_id);
        assert_eq!(issues[0].action, IssueAction::UpdateQuantity { available: 0 });
    }

    #[test]
    fn inactive_and_missing_products_get_remove_flag() {
        let mut inactive = Product::new("SKU-C", "Retired", 300, 10);
        inactive.is_active = false;
        let missing_id = Uuid::new_v4();

        let mut cart = Cart::new(Uuid::new_v4());
        cart.add_item(inactive.id, 1, 300, Variant::default());
        cart.add_item(missing_id, 1, 50, Variant::default());

        let issues = cart.validate_items(&catalog(vec![inactive]));

        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.action == IssueAction::Remove));
    }

    #[test]
    fn zero_quantity_line_gets_remove_flag() {
        // Bypass add_item (which drops zero quantities) to model a corrupted
        // persisted cart
        let product = Product::new("SKU-E", "Stool", 400, 5);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.items.push(crate::cart::CartItem {
            product_id: product.id,
            quantity: 0,
            unit_price: 400,
            line_total: 0,
            variant: Variant::default(),
            added_at: chrono::Utc::now(),
        });

        let issues = cart.validate_items(&catalog(vec![product]));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].action, IssueAction::Remove);
    }

    #[test]
    fn price_drift_reports_old_and_new() {
        let mut product = Product::new("SKU-D", "Lamp", 100, 5);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add_item(product.id, 1, 100, Variant::default());
        product.unit_price = 120;

        let issues = cart.validate_items(&catalog(vec![product]));

        assert_eq!(
            issues[0].action,
            IssueAction::UpdatePrice {
                old_price: 100,
                new_price: 120
            }
        );
    }

    #[test]
    fn validation_does_not_mutate_the_cart() {
        let b = Product::new("SKU-B", "Gadget", 200, 0);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add_item(b.id, 1, 200, Variant::default());
        let before = cart.total_amount;

        let _ = cart.validate_items(&catalog(vec![b]));

        assert_eq!(cart.total_amount, before);
        assert_eq!(cart.items.len(), 1);
    }
}
