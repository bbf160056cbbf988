use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sellgrid_shared::{Address, Variant};
use uuid::Uuid;

/// Fulfillment status in the order lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Refunded => "REFUNDED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Upi,
    Netbanking,
    Wallet,
    Cod,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    None,
    Pending,
    Processed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    Requested,
    Approved,
    Rejected,
    Completed,
}

/// Append-only status audit trail entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub at: DateTime<Utc>,
    pub note: Option<String>,
    pub actor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingInfo {
    pub carrier: String,
    pub tracking_number: String,
    pub tracking_url: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cancellation {
    pub reason: String,
    pub cancelled_at: DateTime<Utc>,
    pub actor_id: Option<Uuid>,
    pub refund_status: RefundStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnItem {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub items: Vec<ReturnItem>,
    pub reason: String,
    pub requested_at: DateTime<Utc>,
    pub status: ReturnStatus,
}

/// Immutable snapshot of a product at purchase time. Deliberately decoupled
/// from the live catalog so later product edits never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub title: String,
    pub sku: String,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub unit_price: i64,
    pub quantity: u32,
    pub line_total: i64,
    pub variant: Variant,
}

/// Monetary breakdown supplied by the pricing step at placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Charges {
    pub tax: i64,
    pub shipping: i64,
    pub discount: i64,
}

/// The single source of truth for a customer's purchase. Created once from a
/// cart snapshot; only the status block mutates afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping: i64,
    pub discount: i64,
    pub total: i64,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub status_history: Vec<StatusHistoryEntry>,
    pub confirmation_sent: bool,
    pub tracking: Option<TrackingInfo>,
    pub cancellation: Option<Cancellation>,
    pub return_request: Option<ReturnRequest>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build an order from cart snapshot items. COD orders start confirmed
    /// (nothing to wait for); everything else starts pending.
    pub fn place(
        order_number: String,
        user_id: Uuid,
        items: Vec<OrderItem>,
        shipping_address: Address,
        payment_method: PaymentMethod,
        payment_captured: bool,
        charges: Charges,
    ) -> Self {
        let now = Utc::now();
        let subtotal: i64 = items.iter().map(|i| i.line_total).sum();
        let status = if payment_method == PaymentMethod::Cod {
            OrderStatus::Confirmed
        } else {
            OrderStatus::Pending
        };

        let mut order = Self {
            id: Uuid::new_v4(),
            order_number,
            user_id,
            items,
            subtotal,
            tax: charges.tax,
            shipping: charges.shipping,
            discount: charges.discount,
            total: 0,
            shipping_address,
            payment_method,
            payment_status: if payment_captured {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Pending
            },
            status,
            status_history: vec![StatusHistoryEntry {
                status,
                at: now,
                note: Some("Order placed".to_string()),
                actor_id: Some(user_id),
            }],
            confirmation_sent: false,
            tracking: None,
            cancellation: None,
            return_request: None,
            confirmed_at: if status == OrderStatus::Confirmed {
                Some(now)
            } else {
                None
            },
            processed_at: None,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };
        order.recompute_total();
        order
    }

    /// total = subtotal + tax + shipping - discount, always.
    pub fn recompute_total(&mut self) {
        self.subtotal = self.items.iter().map(|i| i.line_total).sum();
        self.total = self.subtotal + self.tax + self.shipping - self.discount;
    }

    /// Append a history entry and stamp the matching milestone. Legality of
    /// the transition is NOT checked here; the lifecycle layer consults the
    /// state machine before calling this.
    pub fn apply_status(&mut self, new_status: OrderStatus, note: Option<String>, actor_id: Option<Uuid>) {
        let now = Utc::now();
        self.status = new_status;
        self.status_history.push(StatusHistoryEntry {
            status: new_status,
            at: now,
            note,
            actor_id,
        });
        match new_status {
            OrderStatus::Confirmed => self.confirmed_at = Some(now),
            OrderStatus::Processing => self.processed_at = Some(now),
            OrderStatus::Shipped => self.shipped_at = Some(now),
            OrderStatus::Delivered => self.delivered_at = Some(now),
            OrderStatus::Cancelled => self.cancelled_at = Some(now),
            OrderStatus::Pending | OrderStatus::Refunded => {}
        }
        self.recompute_total();
        self.updated_at = now;
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }

    pub fn can_be_returned(&self, now: DateTime<Utc>, window_days: i64) -> bool {
        if self.status != OrderStatus::Delivered {
            return false;
        }
        match self.delivered_at {
            Some(delivered_at) => now - delivered_at <= Duration::days(window_days),
            None => false,
        }
    }

    /// Attach the cancellation block. The caller owns releasing reserved
    /// stock and, for captured payments, kicking off the refund.
    pub fn record_cancellation(&mut self, reason: String, actor_id: Option<Uuid>) {
        self.cancellation = Some(Cancellation {
            reason,
            cancelled_at: Utc::now(),
            actor_id,
            refund_status: if self.payment_status == PaymentStatus::Paid {
                RefundStatus::Pending
            } else {
                RefundStatus::None
            },
        });
    }

    pub fn record_return_request(&mut self, items: Vec<ReturnItem>, reason: String) {
        self.return_request = Some(ReturnRequest {
            items,
            reason,
            requested_at: Utc::now(),
            status: ReturnStatus::Requested,
        });
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sellgrid_shared::Masked;

    pub(crate) fn test_address() -> Address {
        Address {
            full_name: "Test Buyer".to_string(),
            line1: "1 Main St".to_string(),
            line2: None,
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: "411001".to_string(),
            country: "IN".to_string(),
            email: Masked::new("buyer@example.com".to_string()),
            phone: Masked::new("9999999999".to_string()),
        }
    }

    pub(crate) fn test_item(unit_price: i64, quantity: u32) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            title: "Test Product".to_string(),
            sku: "SKU-T".to_string(),
            brand: None,
            image_url: None,
            unit_price,
            quantity,
            line_total: unit_price * i64::from(quantity),
            variant: Variant::default(),
        }
    }

    fn place_test_order(method: PaymentMethod, captured: bool) -> Order {
        Order::place(
            "SG26080001".to_string(),
            Uuid::new_v4(),
            vec![test_item(250, 1)],
            test_address(),
            method,
            captured,
            Charges {
                tax: 45,
                shipping: 99,
                discount: 0,
            },
        )
    }

    #[test]
    fn total_invariant_holds_at_creation() {
        let order = place_test_order(PaymentMethod::Card, true);
        assert_eq!(order.subtotal, 250);
        assert_eq!(order.total, 250 + 45 + 99);
        assert_eq!(order.total, order.subtotal + order.tax + order.shipping - order.discount);
    }

    #[test]
    fn total_invariant_holds_after_status_updates() {
        let mut order = place_test_order(PaymentMethod::Card, true);
        order.apply_status(OrderStatus::Confirmed, None, None);
        order.apply_status(OrderStatus::Processing, None, None);
        assert_eq!(order.total, order.subtotal + order.tax + order.shipping - order.discount);
    }

    #[test]
    fn cod_orders_start_confirmed() {
        let order = place_test_order(PaymentMethod::Cod, false);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert!(order.confirmed_at.is_some());
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn prepaid_orders_start_pending() {
        let order = place_test_order(PaymentMethod::Upi, true);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn status_history_is_append_only_with_milestones() {
        let mut order = place_test_order(PaymentMethod::Card, true);
        assert_eq!(order.status_history.len(), 1);

        order.apply_status(OrderStatus::Confirmed, Some("ok".to_string()), None);
        order.apply_status(OrderStatus::Processing, None, None);
        order.apply_status(OrderStatus::Shipped, None, None);
        order.apply_status(OrderStatus::Delivered, None, None);

        assert_eq!(order.status_history.len(), 5);
        assert!(order.confirmed_at.is_some());
        assert!(order.processed_at.is_some());
        assert!(order.shipped_at.is_some());
        assert!(order.delivered_at.is_some());
        assert!(order.cancelled_at.is_none());
    }

    #[test]
    fn cancellation_window_matches_lifecycle() {
        let mut order = place_test_order(PaymentMethod::Card, true);
        assert!(order.can_be_cancelled());

        order.apply_status(OrderStatus::Processing, None, None);
        assert!(order.can_be_cancelled());

        order.apply_status(OrderStatus::Shipped, None, None);
        assert!(!order.can_be_cancelled());
    }

    #[test]
    fn return_window_is_thirty_days_from_delivery() {
        let mut order = place_test_order(PaymentMethod::Card, true);
        order.apply_status(OrderStatus::Delivered, None, None);
        let delivered_at = order.delivered_at.unwrap();

        assert!(order.can_be_returned(delivered_at + Duration::days(29), 30));
        assert!(!order.can_be_returned(delivered_at + Duration::days(31), 30));
    }

    #[test]
    fn cancellation_refund_status_tracks_payment() {
        let mut paid = place_test_order(PaymentMethod::Card, true);
        paid.record_cancellation("changed my mind".to_string(), None);
        assert_eq!(paid.cancellation.unwrap().refund_status, RefundStatus::Pending);

        let mut unpaid = place_test_order(PaymentMethod::Cod, false);
        unpaid.record_cancellation("ordered twice".to_string(), None);
        assert_eq!(unpaid.cancellation.unwrap().refund_status, RefundStatus::None);
    }
}
