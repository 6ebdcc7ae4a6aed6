use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::models::device::CardDevice;

/// Background job that sweeps the device registry and marks devices
/// offline when their last heartbeat is older than the staleness window.
/// Devices flagged for maintenance are not touched.
pub async fn run(pool: &PgPool, offline_after_minutes: i64) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - Duration::minutes(offline_after_minutes);

    let marked = CardDevice::mark_stale_offline(pool, cutoff).await?;

    if marked > 0 {
        tracing::warn!(marked, "Marked stale devices offline");
    } else {
        tracing::debug!("No stale devices found");
    }

    Ok(marked)
}
