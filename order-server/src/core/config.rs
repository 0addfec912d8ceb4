/// Server configuration
///
/// # Environment variables
///
/// Every setting can be overridden through the environment:
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/comanda | Working directory (database, logs) |
/// | BUSINESS_TZ | Europe/Madrid | Business timezone for order numbers |
/// | SCHEDULER_INTERVAL_SECS | 60 | Scheduled-order scan interval |
/// | ENVIRONMENT | development | Runtime environment |
/// | LOG_LEVEL | info | Tracing filter level |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the order database and logs
    pub work_dir: String,
    /// Business timezone (IANA name)
    pub business_tz: String,
    /// Scheduled-order worker interval in seconds
    pub scheduler_interval_secs: u64,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Log level for the tracing filter
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/comanda".into()),
            business_tz: std::env::var("BUSINESS_TZ").unwrap_or_else(|_| "Europe/Madrid".into()),
            scheduler_interval_secs: std::env::var("SCHEDULER_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        }
    }

    /// Parsed business timezone, falling back to UTC on a bad name
    pub fn timezone(&self) -> chrono_tz::Tz {
        self.business_tz.parse().unwrap_or_else(|_| {
            tracing::warn!(tz = %self.business_tz, "Unknown timezone, falling back to UTC");
            chrono_tz::UTC
        })
    }

    /// Path of the order database file
    pub fn db_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("orders.redb")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "/var/lib/comanda".into(),
            business_tz: "Europe/Madrid".into(),
            scheduler_interval_secs: 60,
            environment: "development".into(),
            log_level: "info".into(),
        }
    }
}
