use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::cart::Cart;

/// Repository trait for cart access
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn get_cart(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Cart>, Box<dyn std::error::Error + Send + Sync>>;

    async fn save_cart(
        &self,
        cart: &Cart,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Empty the user's cart, keeping the record.
    async fn clear_cart(
        &self,
        user_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Carts with items untouched since `cutoff`, for recovery campaigns.
    async fn find_abandoned(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Cart>, Box<dyn std::error::Error + Send + Sync>>;
}
