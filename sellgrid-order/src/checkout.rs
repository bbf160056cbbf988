use chrono::Utc;
use sellgrid_cart::{Cart, CartIssue, CartRepository};
use sellgrid_catalog::{Product, ProductRepository, StockError, StockLedger};
use sellgrid_shared::events::OrderPlacedEvent;
use sellgrid_shared::{Address, AuthContext};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Charges, Order, OrderItem, OrderStatus, PaymentMethod};
use crate::notify::NotificationService;
use crate::number::{format_order_number, month_counter, SequenceAllocator};
use crate::pricing::PricingRules;
use crate::repository::{OrderRepository, UserStatsRepository};

#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    /// True when an external payment confirmation was already obtained.
    /// Always false for COD. The workflow never talks to a gateway itself.
    pub payment_captured: bool,
    pub discount: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cart validation failed with {} issue(s)", .0.len())]
    CartValidationFailed(Vec<CartIssue>),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("Product is inactive: {0}")]
    ProductInactive(Uuid),

    #[error("Stock reservation lost a race for product {product_id}: requested {requested}, available {available}")]
    StockReservationRace {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Orchestrates cart validation, stock reservation, order creation and the
/// downstream best-effort triggers. Validation steps fail with no side
/// effects; once the order exists, any reservation failure compensates by
/// releasing everything reserved in this request and cancelling the order,
/// so callers never observe partial effects.
pub struct CheckoutWorkflow {
    products: Arc<dyn ProductRepository>,
    stock: Arc<dyn StockLedger>,
    carts: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
    sequences: Arc<dyn SequenceAllocator>,
    stats: Arc<dyn UserStatsRepository>,
    notifier: Arc<dyn NotificationService>,
    rules: PricingRules,
}

impl CheckoutWorkflow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        products: Arc<dyn ProductRepository>,
        stock: Arc<dyn StockLedger>,
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
        sequences: Arc<dyn SequenceAllocator>,
        stats: Arc<dyn UserStatsRepository>,
        notifier: Arc<dyn NotificationService>,
        rules: PricingRules,
    ) -> Self {
        Self {
            products,
            stock,
            carts,
            orders,
            sequences,
            stats,
            notifier,
            rules,
        }
    }

    pub async fn place_order(
        &self,
        auth: &AuthContext,
        request: PlaceOrderRequest,
    ) -> Result<Order, CheckoutError> {
        let user_id = auth.user_id;

        // 1. Load the cart
        let cart = self
            .carts
            .get_cart(user_id)
            .await
            .map_err(storage)?
            .ok_or(CheckoutError::EmptyCart)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // 2. Validate lines against the live catalog; surface flags, do not
        // auto-correct
        let products = self.load_products(&cart).await?;
        let issues = cart.validate_items(&products);
        if !issues.is_empty() {
            return Err(CheckoutError::CartValidationFailed(issues));
        }

        // 3. Fail-fast availability check before anything is written
        for item in &cart.items {
            let product = products
                .get(&item.product_id)
                .ok_or(CheckoutError::ProductInactive(item.product_id))?;
            if !product.is_active {
                return Err(CheckoutError::ProductInactive(product.id));
            }
            if !product.has_stock(i64::from(item.quantity)) {
                return Err(CheckoutError::InsufficientStock {
                    product_id: product.id,
                    requested: i64::from(item.quantity),
                    available: product.stock,
                });
            }
        }

        // 4. Pricing
        let charges = Charges {
            tax: self.rules.tax_amount(cart.total_amount),
            shipping: self.rules.shipping_cost(cart.total_amount, cart.total_items),
            discount: request.discount,
        };

        // 5. Create the order from the cart snapshot
        let now = Utc::now();
        let sequence = self
            .sequences
            .allocate(&month_counter(now))
            .await
            .map_err(storage)?;
        let mut order = Order::place(
            format_order_number(now, sequence),
            user_id,
            snapshot_items(&cart, &products),
            request.shipping_address,
            request.payment_method,
            request.payment_method != PaymentMethod::Cod && request.payment_captured,
            charges,
        );
        self.orders.create_order(&order).await.map_err(storage)?;

        // 6. Reserve stock for every line; all-or-nothing
        let mut reserved: Vec<(Uuid, i64)> = Vec::new();
        for item in &order.items {
            let quantity = i64::from(item.quantity);
            match self.stock.reserve(item.product_id, quantity).await {
                Ok(_) => reserved.push((item.product_id, quantity)),
                Err(StockError::Insufficient {
                    product_id,
                    requested,
                    available,
                }) => {
                    self.compensate(&mut order, &reserved, "stock reservation race")
                        .await;
                    return Err(CheckoutError::StockReservationRace {
                        product_id,
                        requested,
                        available,
                    });
                }
                Err(e) => {
                    self.compensate(&mut order, &reserved, "stock reservation error")
                        .await;
                    return Err(CheckoutError::Storage(e.to_string()));
                }
            }
        }

        // 7. Clear the cart; failing here also unwinds the reservation
        if let Err(e) = self.carts.clear_cart(user_id).await {
            self.compensate(&mut order, &reserved, "cart clearing failed")
                .await;
            return Err(CheckoutError::Storage(e.to_string()));
        }

        // Confirmation goes out below, so a later CONFIRMED transition will
        // not re-send it
        order.confirmation_sent = true;
        self.orders.save_order(&order).await.map_err(storage)?;

        let event = OrderPlacedEvent {
            order_id: order.id,
            order_number: order.order_number.clone(),
            user_id,
            total: order.total,
            item_count: order.items.iter().map(|i| i.quantity).sum(),
            timestamp: now.timestamp(),
        };
        tracing::info!(?event, "order placed");

        // 8. User aggregates, best-effort
        if let Err(e) = self.stats.record_order(user_id, order.total).await {
            tracing::warn!(order_number = %order.order_number, "failed to update user stats: {e}");
        }

        // 9. Confirmation notification, off the critical path
        let notifier = Arc::clone(&self.notifier);
        let placed = order.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.order_confirmation(&placed).await {
                tracing::warn!(order_number = %placed.order_number, "confirmation notification failed: {e}");
            }
        });

        Ok(order)
    }

    async fn load_products(&self, cart: &Cart) -> Result<HashMap<Uuid, Product>, CheckoutError> {
        let ids: Vec<Uuid> = cart.items.iter().map(|i| i.product_id).collect();
        let products = self.products.get_products(&ids).await.map_err(storage)?;
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    /// Unwind a partially-completed placement: release exactly the
    /// reservations made in this request, then cancel the order record.
    async fn compensate(&self, order: &mut Order, reserved: &[(Uuid, i64)], reason: &str) {
        for (product_id, quantity) in reserved {
            if let Err(e) = self.stock.release(*product_id, *quantity).await {
                tracing::error!(
                    %product_id,
                    quantity,
                    "compensation release failed: {e}"
                );
            }
        }
        order.apply_status(OrderStatus::Cancelled, Some(reason.to_string()), None);
        order.record_cancellation(reason.to_string(), None);
        if let Err(e) = self.orders.save_order(order).await {
            tracing::error!(order_number = %order.order_number, "failed to persist compensated order: {e}");
        }
    }
}

fn snapshot_items(cart: &Cart, products: &HashMap<Uuid, Product>) -> Vec<OrderItem> {
    cart.items
        .iter()
        .filter_map(|item| {
            products.get(&item.product_id).map(|product| OrderItem {
                id: Uuid::new_v4(),
                product_id: product.id,
                title: product.title.clone(),
                sku: product.sku.clone(),
                brand: product.brand.clone(),
                image_url: product.image_url.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                line_total: item.line_total,
                variant: item.variant.clone(),
            })
        })
        .collect()
}

fn storage(e: Box<dyn std::error::Error + Send + Sync>) -> CheckoutError {
    CheckoutError::Storage(e.to_string())
}
