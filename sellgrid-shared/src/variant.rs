use serde::{Deserialize, Serialize};

/// Variant descriptors selected when a product lands in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Variant {
    pub size: Option<String>,
    pub color: Option<String>,
}

impl Variant {
    pub fn is_default(&self) -> bool {
        self.size.is_none() && self.color.is_none()
    }
}
