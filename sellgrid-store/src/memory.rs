use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sellgrid_cart::{Cart, CartRepository};
use sellgrid_catalog::{Product, ProductRepository, StockError, StockLedger};
use sellgrid_order::number::SequenceAllocator;
use sellgrid_order::repository::{OrderRepository, UserStats, UserStatsRepository};
use sellgrid_order::{Order, OrderStatus};
use sellgrid_shared::events::StockAdjustedEvent;
use std::collections::{HashMap, HashSet};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate SKU: {0}")]
    DuplicateSku(String),

    #[error("Duplicate order number: {0}")]
    DuplicateOrderNumber(String),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),
}

/// In-process document store. Each collection sits behind its own lock; the
/// stock decrement and the sequence counter run their check-and-write under
/// a single write guard, which is the in-memory equivalent of the document
/// database's atomic conditional update.
#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<HashMap<Uuid, Product>>,
    carts: RwLock<HashMap<Uuid, Cart>>,
    orders: RwLock<HashMap<Uuid, Order>>,
    order_numbers: RwLock<HashSet<String>>,
    counters: Mutex<HashMap<String, u32>>,
    stats: RwLock<HashMap<Uuid, UserStats>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StockLedger for MemoryStore {
    async fn reserve(&self, product_id: Uuid, quantity: i64) -> Result<i64, StockError> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }

        let mut products = self.products.write().await;
        let product = products
            .get_mut(&product_id)
            .ok_or(StockError::NotFound(product_id))?;

        // Conditional decrement: both the comparison and the write happen
        // under the collection's write guard, so concurrent reservations
        // serialize here and stock can never go negative.
        if product.stock < quantity {
            return Err(StockError::Insufficient {
                product_id,
                requested: quantity,
                available: product.stock,
            });
        }

        product.stock -= quantity;
        product.last_stock_update = Utc::now();

        let event = StockAdjustedEvent {
            product_id,
            delta: -quantity,
            new_stock: product.stock,
            timestamp: product.last_stock_update.timestamp(),
        };
        tracing::debug!(?event, "stock reserved");

        Ok(product.stock)
    }

    async fn release(&self, product_id: Uuid, quantity: i64) -> Result<i64, StockError> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }

        let mut products = self.products.write().await;
        let product = products
            .get_mut(&product_id)
            .ok_or(StockError::NotFound(product_id))?;

        product.stock += quantity;
        product.last_stock_update = Utc::now();

        let event = StockAdjustedEvent {
            product_id,
            delta: quantity,
            new_stock: product.stock,
            timestamp: product.last_stock_update.timestamp(),
        };
        tracing::debug!(?event, "stock released");

        Ok(product.stock)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create_product(
        &self,
        product: &Product,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        let mut products = self.products.write().await;
        if products.values().any(|p| p.sku == product.sku) {
            return Err(Box::new(StoreError::DuplicateSku(product.sku.clone())));
        }
        products.insert(product.id, product.clone());
        Ok(product.id)
    }

    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn get_products(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Product>, Box<dyn std::error::Error + Send + Sync>> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn update_product(
        &self,
        product: &Product,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut products = self.products.write().await;
        if !products.contains_key(&product.id) {
            return Err(Box::new(StoreError::ProductNotFound(product.id)));
        }
        products.insert(product.id, product.clone());
        Ok(())
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn get_cart(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Cart>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn save_cart(
        &self,
        cart: &Cart,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.carts.write().await.insert(cart.user_id, cart.clone());
        Ok(())
    }

    async fn clear_cart(
        &self,
        user_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(cart) = self.carts.write().await.get_mut(&user_id) {
            cart.clear();
        }
        Ok(())
    }

    async fn find_abandoned(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Cart>, Box<dyn std::error::Error + Send + Sync>> {
        let carts = self.carts.read().await;
        Ok(carts
            .values()
            .filter(|c| !c.is_empty() && c.updated_at < cutoff)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        // Unique-index equivalent for the order number
        let mut numbers = self.order_numbers.write().await;
        if !numbers.insert(order.order_number.clone()) {
            return Err(Box::new(StoreError::DuplicateOrderNumber(
                order.order_number.clone(),
            )));
        }
        self.orders.write().await.insert(order.id, order.clone());
        Ok(order.id)
    }

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn save_order(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn save_order_if_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.write().await;
        match orders.get(&order.id) {
            Some(stored) if stored.status == expected => {
                orders.insert(order.id, order.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_orders(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}

#[async_trait]
impl UserStatsRepository for MemoryStore {
    async fn record_order(
        &self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut stats = self.stats.write().await;
        let entry = stats.entry(user_id).or_default();
        entry.order_count += 1;
        entry.lifetime_spend += amount;
        Ok(())
    }

    async fn record_delivery(
        &self,
        user_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut stats = self.stats.write().await;
        stats.entry(user_id).or_default().delivered_count += 1;
        Ok(())
    }

    async fn get_stats(
        &self,
        user_id: Uuid,
    ) -> Result<UserStats, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .stats
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl SequenceAllocator for MemoryStore {
    async fn allocate(
        &self,
        counter: &str,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        let mut counters = self.counters.lock().await;
        let next = counters.entry(counter.to_string()).or_insert(0);
        *next += 1;
        Ok(*next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sellgrid_shared::Variant;

    #[tokio::test]
    async fn duplicate_sku_is_rejected() {
        let store = MemoryStore::new();
        let first = Product::new("SKU-1", "Widget", 100, 5);
        let second = Product::new("SKU-1", "Widget Reissue", 150, 3);

        store.create_product(&first).await.unwrap();
        assert!(store.create_product(&second).await.is_err());
    }

    #[tokio::test]
    async fn reserve_is_conditional_and_release_inverts_it() {
        let store = MemoryStore::new();
        let product = Product::new("SKU-2", "Lamp", 1999, 5);
        store.create_product(&product).await.unwrap();

        assert_eq!(store.reserve(product.id, 3).await.unwrap(), 2);
        let err = store.reserve(product.id, 3).await.unwrap_err();
        assert!(matches!(err, StockError::Insufficient { available: 2, .. }));

        assert_eq!(store.release(product.id, 3).await.unwrap(), 5);
        assert_eq!(store.get_product(product.id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn reserve_rejects_non_positive_quantities() {
        let store = MemoryStore::new();
        let product = Product::new("SKU-3", "Mug", 299, 5);
        store.create_product(&product).await.unwrap();

        assert!(matches!(
            store.reserve(product.id, 0).await.unwrap_err(),
            StockError::InvalidQuantity(0)
        ));
        assert!(matches!(
            store.release(product.id, -1).await.unwrap_err(),
            StockError::InvalidQuantity(-1)
        ));
    }

    #[tokio::test]
    async fn conditional_order_save_rejects_stale_status() {
        use sellgrid_order::models::{Charges, PaymentMethod};
        use sellgrid_shared::{Address, Masked};

        let address = Address {
            full_name: "Test Buyer".to_string(),
            line1: "1 Main St".to_string(),
            line2: None,
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: "411001".to_string(),
            country: "IN".to_string(),
            email: Masked::new("buyer@example.com".to_string()),
            phone: Masked::new("9999999999".to_string()),
        };
        let order = Order::place(
            "SG26080001".to_string(),
            Uuid::new_v4(),
            vec![],
            address,
            PaymentMethod::Card,
            true,
            Charges::default(),
        );

        let store = MemoryStore::new();
        store.create_order(&order).await.unwrap();

        // Two writers both read PENDING; only the first conditional save may
        // land
        let mut cancelled = order.clone();
        cancelled.apply_status(OrderStatus::Cancelled, None, None);
        let mut confirmed = order.clone();
        confirmed.apply_status(OrderStatus::Confirmed, None, None);

        assert!(store
            .save_order_if_status(&cancelled, OrderStatus::Pending)
            .await
            .unwrap());
        assert!(!store
            .save_order_if_status(&confirmed, OrderStatus::Pending)
            .await
            .unwrap());

        let stored = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn sequence_counter_is_monotonic_per_key() {
        let store = MemoryStore::new();
        assert_eq!(store.allocate("orders:2608").await.unwrap(), 1);
        assert_eq!(store.allocate("orders:2608").await.unwrap(), 2);
        assert_eq!(store.allocate("orders:2609").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_cart_keeps_the_record() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let mut cart = Cart::new(user_id);
        cart.add_item(Uuid::new_v4(), 2, 100, Variant::default());
        store.save_cart(&cart).await.unwrap();

        store.clear_cart(user_id).await.unwrap();

        let cleared = store.get_cart(user_id).await.unwrap().unwrap();
        assert!(cleared.is_empty());
        assert_eq!(cleared.total_amount, 0);
    }

    #[tokio::test]
    async fn abandoned_scan_skips_fresh_and_empty_carts() {
        let store = MemoryStore::new();

        let mut stale = Cart::new(Uuid::new_v4());
        stale.add_item(Uuid::new_v4(), 1, 100, Variant::default());
        stale.updated_at = Utc::now() - Duration::days(3);
        store.save_cart(&stale).await.unwrap();

        let mut fresh = Cart::new(Uuid::new_v4());
        fresh.add_item(Uuid::new_v4(), 1, 100, Variant::default());
        store.save_cart(&fresh).await.unwrap();

        let empty = Cart::new(Uuid::new_v4());
        store.save_cart(&empty).await.unwrap();

        let cutoff = Utc::now() - Duration::days(1);
        let abandoned = store.find_abandoned(cutoff).await.unwrap();
        assert_eq!(abandoned.len(), 1);
        assert_eq!(abandoned[0].user_id, stale.user_id);
    }

    #[tokio::test]
    async fn user_stats_accumulate() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();

        store.record_order(user_id, 394).await.unwrap();
        store.record_order(user_id, 1200).await.unwrap();
        store.record_delivery(user_id).await.unwrap();

        let stats = store.get_stats(user_id).await.unwrap();
        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.lifetime_spend, 1594);
        assert_eq!(stats.delivered_count, 1);
    }
}
