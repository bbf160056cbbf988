pub mod product;
pub mod repository;
pub mod stock;

pub use product::Product;
pub use repository::ProductRepository;
pub use stock::{StockError, StockLedger};
