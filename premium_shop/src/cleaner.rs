use actix_web::web;
use tokio::time::{Duration, sleep};

use crate::state::AppState;

/// Background sweep that expires pending orders nobody paid within the
/// configured timeout. A failed sweep is logged and retried on the next
/// tick; it never takes the server down.
pub async fn start_order_cleaner(
    data: web::Data<AppState>,
    timeout_minutes: i64,
    interval_seconds: u64,
) {
    log::info!(
        "Order cleaner started (check every {}s, timeout {}m)",
        interval_seconds,
        timeout_minutes
    );

    loop {
        match data.db.expire_stale(timeout_minutes).await {
            Ok(0) => {}
            Ok(count) => log::info!("Expired {} stale pending orders", count),
            Err(e) => log::error!("Order cleaner sweep failed: {:#}", e),
        }

        sleep(Duration::from_secs(interval_seconds)).await;
    }
}
