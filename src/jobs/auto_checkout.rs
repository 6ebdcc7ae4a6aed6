use sqlx::PgPool;

use crate::models::attendance::AttendanceRecord;

/// Background job that closes open check-ins for events whose late
/// check-in window has passed. Attendees who never badged out are
/// checked out at the event's end time.
pub async fn run(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let closed = AttendanceRecord::close_expired(pool).await?;

    if closed > 0 {
        tracing::info!(closed, "Auto-closed stale check-ins");
    } else {
        tracing::debug!("No stale check-ins to close");
    }

    Ok(closed)
}
