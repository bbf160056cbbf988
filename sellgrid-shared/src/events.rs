use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderPlacedEvent {
    pub order_id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub total: i64,
    pub item_count: u32,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderStatusChangedEvent {
    pub order_id: Uuid,
    pub order_number: String,
    pub from: String,
    pub to: String,
    pub actor_id: Option<Uuid>,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct StockAdjustedEvent {
    pub product_id: Uuid,
    pub delta: i64,
    pub new_stock: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct CartAbandonedEvent {
    pub user_id: Uuid,
    pub total_amount: i64,
    pub last_modified: i64,
}
