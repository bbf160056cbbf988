use chrono::{DateTime, Duration, Utc};
use sellgrid_shared::events::CartAbandonedEvent;

use crate::cart::Cart;
use crate::repository::CartRepository;

/// Scan for carts with items untouched for longer than `window_minutes` and
/// emit an event per cart for recovery campaigns downstream. Read-only: the
/// carts themselves are left as they are so a returning customer finds
/// everything still in place.
pub async fn sweep_abandoned(
    carts: &dyn CartRepository,
    now: DateTime<Utc>,
    window_minutes: i64,
) -> Result<Vec<Cart>, Box<dyn std::error::Error + Send + Sync>> {
    let cutoff = now - Duration::minutes(window_minutes);
    let abandoned = carts.find_abandoned(cutoff).await?;

    for cart in &abandoned {
        let event = CartAbandonedEvent {
            user_id: cart.user_id,
            total_amount: cart.total_amount,
            last_modified: cart.updated_at.timestamp(),
        };
        tracing::info!(?event, "cart abandoned");
    }

    Ok(abandoned)
}
