use async_trait::async_trait;
use uuid::Uuid;

use crate::product::Product;

/// Repository trait for product catalog access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(
        &self,
        product: &Product,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>>;

    /// Batch lookup for cart validation; missing ids are simply absent from
    /// the result.
    async fn get_products(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Product>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_product(
        &self,
        product: &Product,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
