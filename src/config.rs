use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub base_url: String,
    pub host: String,
    pub port: u16,

    // Security
    pub session_secret: Secret<String>,
    pub card_signing_secret: Secret<String>,

    // Device watchdog: minutes without a heartbeat before a device is
    // considered offline.
    pub device_offline_after_minutes: i64,

    // Cron expressions for background jobs
    pub device_watchdog_schedule: String,
    pub auto_checkout_schedule: String,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Ok(Self {
            database_url: config.get("database_url")?,
            base_url: config.get("base_url")?,
            host: config.get("host").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: config.get("port")?,

            session_secret: Secret::new(config.get("session_secret")?),
            card_signing_secret: Secret::new(config.get("card_signing_secret")?),

            device_offline_after_minutes: config
                .get("device_offline_after_minutes")
                .unwrap_or(15),

            device_watchdog_schedule: config
                .get("device_watchdog_schedule")
                .unwrap_or_else(|_| "0 */5 * * * *".to_string()),
            auto_checkout_schedule: config
                .get("auto_checkout_schedule")
                .unwrap_or_else(|_| "0 */15 * * * *".to_string()),
        })
    }
}
