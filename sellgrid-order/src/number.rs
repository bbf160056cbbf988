use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};

/// Allocates monotonically increasing sequence numbers for a named counter.
/// Implementations must increment atomically; order numbers are derived from
/// this, never from scanning existing orders.
#[async_trait]
pub trait SequenceAllocator: Send + Sync {
    async fn allocate(
        &self,
        counter: &str,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>>;
}

/// Counter name for a given month, e.g. "orders:2608" for August 2026.
pub fn month_counter(at: DateTime<Utc>) -> String {
    format!("orders:{:02}{:02}", at.year() % 100, at.month())
}

/// Human-readable order number: SG + 2-digit year + 2-digit month + 4-digit
/// monthly sequence.
pub fn format_order_number(at: DateTime<Utc>, sequence: u32) -> String {
    format!("SG{:02}{:02}{:04}", at.year() % 100, at.month(), sequence)
}
