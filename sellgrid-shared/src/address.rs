use serde::{Deserialize, Serialize};

use crate::pii::Masked;

/// Shipping address snapshot. Orders keep their own copy so later edits to a
/// user's address book never rewrite historical orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub full_name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
}

impl Address {
    pub fn one_line(&self) -> String {
        match &self.line2 {
            Some(line2) => format!(
                "{}, {}, {}, {} {}, {}",
                self.line1, line2, self.city, self.state, self.postal_code, self.country
            ),
            None => format!(
                "{}, {}, {} {}, {}",
                self.line1, self.city, self.state, self.postal_code, self.country
            ),
        }
    }
}
