use chrono::Utc;
use sellgrid_catalog::StockLedger;
use sellgrid_shared::events::OrderStatusChangedEvent;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    Order, OrderStatus, PaymentMethod, PaymentStatus, RefundStatus, ReturnItem, TrackingInfo,
};
use crate::notify::NotificationService;
use crate::pricing::PricingRules;
use crate::repository::{OrderRepository, UserStatsRepository};
use crate::transitions;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Tracking info is required before order {0} can be shipped")]
    TrackingRequired(Uuid),

    #[error("Return window expired for order {0}")]
    ReturnWindowExpired(Uuid),

    #[error("A return request already exists for order {0}")]
    DuplicateReturnRequest(Uuid),

    #[error("Return items and reason are required")]
    EmptyReturnRequest,

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Drives status transitions and their collaborator obligations: legality
/// checks against the state machine, stock release on cancellation,
/// notifications on confirm/ship, analytics on delivery. The aggregate
/// itself records history blindly; every guard lives here.
pub struct LifecycleManager {
    orders: Arc<dyn OrderRepository>,
    stock: Arc<dyn StockLedger>,
    stats: Arc<dyn UserStatsRepository>,
    notifier: Arc<dyn NotificationService>,
    rules: PricingRules,
}

impl LifecycleManager {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        stock: Arc<dyn StockLedger>,
        stats: Arc<dyn UserStatsRepository>,
        notifier: Arc<dyn NotificationService>,
        rules: PricingRules,
    ) -> Self {
        Self {
            orders,
            stock,
            stats,
            notifier,
            rules,
        }
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<Order, OrderError> {
        self.orders
            .get_order(order_id)
            .await
            .map_err(storage)?
            .ok_or(OrderError::NotFound(order_id))
    }

    pub async fn list_orders(&self, user_id: Uuid) -> Result<Vec<Order>, OrderError> {
        self.orders.list_orders(user_id).await.map_err(storage)
    }

    /// Move an order to `new_status`, rejecting anything the state machine
    /// does not allow, then run the transition's side effects.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        note: Option<String>,
        actor_id: Option<Uuid>,
    ) -> Result<Order, OrderError> {
        let mut order = self.get_order(order_id).await?;
        let from = order.status;

        if !transitions::is_allowed(from, new_status) {
            return Err(illegal(from, new_status));
        }
        if new_status == OrderStatus::Shipped && order.tracking.is_none() {
            return Err(OrderError::TrackingRequired(order_id));
        }
        if new_status == OrderStatus::Refunded && order.payment_status != PaymentStatus::Paid {
            return Err(illegal(from, new_status));
        }

        order.apply_status(new_status, note.clone(), actor_id);

        let mut send_confirmation = false;
        match new_status {
            OrderStatus::Confirmed => {
                if !order.confirmation_sent {
                    order.confirmation_sent = true;
                    send_confirmation = true;
                }
            }
            OrderStatus::Delivered => {
                // COD settles on the doorstep
                if order.payment_method == PaymentMethod::Cod {
                    order.payment_status = PaymentStatus::Paid;
                }
            }
            OrderStatus::Cancelled => {
                order.record_cancellation(
                    note.unwrap_or_else(|| "cancelled".to_string()),
                    actor_id,
                );
            }
            OrderStatus::Refunded => {
                order.payment_status = PaymentStatus::Refunded;
                if let Some(cancellation) = order.cancellation.as_mut() {
                    cancellation.refund_status = RefundStatus::Processed;
                }
            }
            OrderStatus::Pending | OrderStatus::Processing | OrderStatus::Shipped => {}
        }

        // Conditional write on the status read above. The loser of two
        // racing transitions lands here with a stale `from` and is rejected
        // before any of its side effects run, so stock cannot be released
        // twice.
        let saved = self
            .orders
            .save_order_if_status(&order, from)
            .await
            .map_err(storage)?;
        if !saved {
            let current = self.get_order(order_id).await?;
            return Err(illegal(current.status, new_status));
        }

        match new_status {
            OrderStatus::Confirmed => {
                if send_confirmation {
                    self.spawn_confirmation(&order);
                }
            }
            OrderStatus::Shipped => self.spawn_shipping_update(&order),
            OrderStatus::Delivered => {
                if let Err(e) = self.stats.record_delivery(order.user_id).await {
                    tracing::warn!(order_number = %order.order_number, "failed to record delivery stats: {e}");
                }
            }
            OrderStatus::Cancelled => self.release_items(&order).await,
            _ => {}
        }

        let event = OrderStatusChangedEvent {
            order_id: order.id,
            order_number: order.order_number.clone(),
            from: from.as_str().to_string(),
            to: new_status.as_str().to_string(),
            actor_id,
            timestamp: Utc::now().timestamp(),
        };
        tracing::info!(?event, "order status changed");

        Ok(order)
    }

    /// Cancellation entry point; only reachable while the order is pending,
    /// confirmed or processing. Releases every line's reservation.
    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        reason: String,
        actor_id: Option<Uuid>,
    ) -> Result<Order, OrderError> {
        let order = self.get_order(order_id).await?;
        if !order.can_be_cancelled() {
            return Err(illegal(order.status, OrderStatus::Cancelled));
        }
        self.update_status(order_id, OrderStatus::Cancelled, Some(reason), actor_id)
            .await
    }

    pub async fn add_tracking(
        &self,
        order_id: Uuid,
        tracking: TrackingInfo,
    ) -> Result<Order, OrderError> {
        let mut order = self.get_order(order_id).await?;
        if transitions::is_terminal(order.status) {
            return Err(OrderError::IllegalTransition {
                from: order.status.as_str().to_string(),
                to: "TRACKING_UPDATE".to_string(),
            });
        }
        order.tracking = Some(tracking);
        order.updated_at = Utc::now();
        self.orders.save_order(&order).await.map_err(storage)?;
        Ok(order)
    }

    pub async fn request_return(
        &self,
        order_id: Uuid,
        items: Vec<ReturnItem>,
        reason: String,
    ) -> Result<Order, OrderError> {
        if items.is_empty() || reason.trim().is_empty() {
            return Err(OrderError::EmptyReturnRequest);
        }

        let mut order = self.get_order(order_id).await?;
        if order.return_request.is_some() {
            return Err(OrderError::DuplicateReturnRequest(order_id));
        }
        if order.status != OrderStatus::Delivered {
            return Err(OrderError::IllegalTransition {
                from: order.status.as_str().to_string(),
                to: "RETURN_REQUESTED".to_string(),
            });
        }
        if !order.can_be_returned(Utc::now(), self.rules.return_window_days) {
            return Err(OrderError::ReturnWindowExpired(order_id));
        }

        order.record_return_request(items, reason);
        self.orders.save_order(&order).await.map_err(storage)?;
        Ok(order)
    }

    /// Complete the refund branch for a paid order that was cancelled or
    /// returned after delivery.
    pub async fn mark_refunded(
        &self,
        order_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> Result<Order, OrderError> {
        self.update_status(order_id, OrderStatus::Refunded, None, actor_id)
            .await
    }

    async fn release_items(&self, order: &Order) {
        for item in &order.items {
            if let Err(e) = self
                .stock
                .release(item.product_id, i64::from(item.quantity))
                .await
            {
                tracing::error!(
                    order_number = %order.order_number,
                    product_id = %item.product_id,
                    "failed to release stock on cancellation: {e}"
                );
            }
        }
    }

    fn spawn_confirmation(&self, order: &Order) {
        let notifier = Arc::clone(&self.notifier);
        let order = order.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.order_confirmation(&order).await {
                tracing::warn!(order_number = %order.order_number, "confirmation notification failed: {e}");
            }
        });
    }

    fn spawn_shipping_update(&self, order: &Order) {
        let notifier = Arc::clone(&self.notifier);
        let order = order.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.shipping_update(&order).await {
                tracing::warn!(order_number = %order.order_number, "shipping notification failed: {e}");
            }
        });
    }
}

fn illegal(from: OrderStatus, to: OrderStatus) -> OrderError {
    OrderError::IllegalTransition {
        from: from.as_str().to_string(),
        to: to.as_str().to_string(),
    }
}

fn storage(e: Box<dyn std::error::Error + Send + Sync>) -> OrderError {
    OrderError::Storage(e.to_string())
}
