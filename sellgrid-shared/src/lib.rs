pub mod address;
pub mod auth;
pub mod events;
pub mod pii;
pub mod variant;

pub use address::Address;
pub use auth::{AuthContext, Role};
pub use pii::Masked;
pub use variant::Variant;
