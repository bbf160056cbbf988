use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Order, OrderStatus};

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Persist the current state of an already-created order.
    async fn save_order(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Persist only if the stored order still carries `expected` status
    /// (conditional update). Returns false when a concurrent transition got
    /// there first, so racing status changes serialize instead of both
    /// running their side effects.
    async fn save_order_if_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_orders(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Per-user aggregate counters, maintained best-effort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub order_count: u64,
    pub lifetime_spend: i64,
    pub delivered_count: u64,
}

#[async_trait]
pub trait UserStatsRepository: Send + Sync {
    /// Bump order count and lifetime spend after a successful checkout.
    async fn record_order(
        &self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Bump delivered-purchase analytics when an order reaches DELIVERED.
    async fn record_delivery(
        &self,
        user_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get_stats(
        &self,
        user_id: Uuid,
    ) -> Result<UserStats, Box<dyn std::error::Error + Send + Sync>>;
}
