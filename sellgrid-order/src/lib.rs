pub mod checkout;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod number;
pub mod pricing;
pub mod repository;
pub mod transitions;

pub use checkout::{CheckoutError, CheckoutWorkflow, PlaceOrderRequest};
pub use lifecycle::{LifecycleManager, OrderError};
pub use models::{Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus};
pub use notify::{LogNotifier, NotificationService};
pub use number::SequenceAllocator;
pub use pricing::PricingRules;
