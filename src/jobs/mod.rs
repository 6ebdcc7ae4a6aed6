// Jobs module - Scheduled background work

pub mod auto_checkout;
pub mod device_watchdog;
