use rust_decimal::Decimal;

/// Engine configuration
///
/// # Environment variables
///
/// All settings can be overridden through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HALL_DB_PATH | hall.redb | Database file for the engine store |
/// | HOURLY_RATE | 60000 | Table rental rate per hour |
///
/// # Example
///
/// ```ignore
/// HALL_DB_PATH=/data/hall.redb HOURLY_RATE=80000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the redb database file
    pub db_path: String,
    /// Time-based usage fee charged per hour of play
    pub hourly_rate: Decimal,
}

/// Default rental rate per hour
const DEFAULT_HOURLY_RATE: i64 = 60_000;

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("HALL_DB_PATH").unwrap_or_else(|_| "hall.redb".into()),
            hourly_rate: std::env::var("HOURLY_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| Decimal::from(DEFAULT_HOURLY_RATE)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "hall.redb".into(),
            hourly_rate: Decimal::from(DEFAULT_HOURLY_RATE),
        }
    }
}
