#![allow(dead_code)]

use sellgrid_cart::{Cart, CartRepository};
use sellgrid_catalog::{Product, ProductRepository};
use sellgrid_order::checkout::PlaceOrderRequest;
use sellgrid_order::{
    CheckoutWorkflow, LifecycleManager, LogNotifier, PaymentMethod, PricingRules,
};
use sellgrid_shared::{Address, Masked, Variant};
use sellgrid_store::MemoryStore;
use std::sync::Arc;
use uuid::Uuid;

pub fn address() -> Address {
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

pub fn request(payment_method: PaymentMethod, payment_captured: bool) -> PlaceOrderRequest {
    PlaceOrderRequest {
        shipping_address: address(),
        payment_method,
        payment_captured,
        discount: 0,
    }
}

pub fn workflow(store: &Arc<MemoryStore>) -> CheckoutWorkflow {
    CheckoutWorkflow::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(LogNotifier),
        PricingRules::default(),
    )
}

pub fn lifecycle(store: &Arc<MemoryStore>) -> LifecycleManager {
    LifecycleManager::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(LogNotifier),
        PricingRules::default(),
    )
}

pub async fn seed_product(store: &Arc<MemoryStore>, sku: &str, price: i64, stock: i64) -> Product {
    let product = Product::new(sku, format!("Product {sku}"), price, stock);
    store.create_product(&product).await.unwrap();
    product
}

pub async fn seed_cart(store: &Arc<MemoryStore>, user_id: Uuid, lines: &[(&Product, u32)]) -> Cart {
    let mut cart = Cart::new(user_id);
    for (product, quantity) in lines {
        cart.add_item(product.id, *quantity, product.unit_price, Variant::default());
    }
    store.save_cart(&cart).await.unwrap();
    cart
}

pub async fn stock_of(store: &Arc<MemoryStore>, product: &Product) -> i64 {
    store.get_product(product.id).await.unwrap().unwrap().stock
}
