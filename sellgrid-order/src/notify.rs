use async_trait::async_trait;

use crate::models::Order;

/// Downstream notification collaborator (email/SMS behind the scenes). The
/// workflow calls it fire-and-forget: failures are logged, never surfaced,
/// and never roll anything back.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn order_confirmation(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn shipping_update(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Default notifier: records the send in the log and does nothing else.
/// Useful for tests and local runs without an email provider.
pub struct LogNotifier;

#[async_trait]
impl NotificationService for LogNotifier {
    async fn order_confirmation(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            order_number = %order.order_number,
            total = order.total,
            "order confirmation notification"
        );
        Ok(())
    }

    async fn shipping_update(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            order_number = %order.order_number,
            tracking = ?order.tracking.as_ref().map(|t| t.tracking_number.clone()),
            "shipping update notification"
        );
        Ok(())
    }
}
