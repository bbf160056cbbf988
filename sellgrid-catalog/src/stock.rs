use async_trait::async_trait;
use uuid::Uuid;

/// Stock ledger contract. Implementations must make `reserve` a single
/// atomic conditional decrement ("decrement only if stock >= quantity"), so
/// two racing reservations can never both win the last units and stock can
/// never go negative.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Reserve `quantity` units. Returns the new stock level on success.
    async fn reserve(&self, product_id: Uuid, quantity: i64) -> Result<i64, StockError>;

    /// Return `quantity` units to stock (cancellation, failed payment,
    /// refund). Unconditional; idempotency is the caller's responsibility.
    /// Returns the new stock level.
    async fn release(&self, product_id: Uuid, quantity: i64) -> Result<i64, StockError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    Insufficient {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("Invalid quantity {0}: must be positive")]
    InvalidQuantity(i64),
}
