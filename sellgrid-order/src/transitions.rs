use crate::models::OrderStatus;

/// Legal next states for each order status. The normal path is strictly
/// forward (pending -> confirmed -> processing -> shipped -> delivered);
/// cancelled is a side exit from the three pre-shipment states, and refunded
/// is reachable only after cancellation or delivery of a paid order (the
/// paid check lives in the lifecycle layer, which sees payment status).
pub fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
        OrderStatus::Confirmed => &[OrderStatus::Processing, OrderStatus::Cancelled],
        OrderStatus::Processing => &[OrderStatus::Shipped, OrderStatus::Cancelled],
        OrderStatus::Shipped => &[OrderStatus::Delivered],
        OrderStatus::Delivered => &[OrderStatus::Refunded],
        OrderStatus::Cancelled => &[OrderStatus::Refunded],
        OrderStatus::Refunded => &[],
    }
}

pub fn is_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

pub fn is_terminal(status: OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
    )
}
