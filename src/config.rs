use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Files,
}

impl StorageBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Some(StorageBackend::Sqlite),
            "files" | "file" | "json" => Some(StorageBackend::Files),
            _ => None,
        }
    }
}

/// One week.
pub const MAX_SESSION_TTL_MINUTES: i64 = 7 * 24 * 60;
pub const MAX_BOOKING_HORIZON_DAYS: u32 = 90;

/// Parses a positive setting and caps it at `max`. Missing, unparsable or
/// non-positive values fall back to `default`.
fn bounded<T>(raw: Option<&str>, default: T, max: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default + Copy,
{
    match raw.and_then(|v| v.trim().parse::<T>().ok()) {
        Some(v) if v > T::default() => {
            if v > max {
                max
            } else {
                v
            }
        }
        _ => default,
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub database_url: String,
    pub data_dir: String,
    /// Empty means a random per-process secret is generated at startup.
    pub session_secret: String,
    pub session_ttl_minutes: i64,
    pub booking_horizon_days: u32,
    pub seed_sample_doctors: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            storage_backend: env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|v| StorageBackend::parse(&v))
                .unwrap_or(StorageBackend::Sqlite),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "clinicbook.db".to_string()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            session_secret: env::var("SESSION_SECRET").unwrap_or_default(),
            session_ttl_minutes: bounded(
                env::var("SESSION_TTL_MINUTES").ok().as_deref(),
                30,
                MAX_SESSION_TTL_MINUTES,
            ),
            booking_horizon_days: bounded(
                env::var("BOOKING_HORIZON_DAYS").ok().as_deref(),
                7,
                MAX_BOOKING_HORIZON_DAYS,
            ),
            seed_sample_doctors: env::var("SEED_SAMPLE_DOCTORS")
                .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(StorageBackend::parse("sqlite"), Some(StorageBackend::Sqlite));
        assert_eq!(StorageBackend::parse(" Files "), Some(StorageBackend::Files));
        assert_eq!(StorageBackend::parse("postgres"), None);
    }

    #[test]
    fn test_bounded_caps_large_values() {
        assert_eq!(bounded(Some("9223372036854775807"), 30, MAX_SESSION_TTL_MINUTES), MAX_SESSION_TTL_MINUTES);
        assert_eq!(bounded(Some("4000000000"), 7, MAX_BOOKING_HORIZON_DAYS), MAX_BOOKING_HORIZON_DAYS);
        assert_eq!(bounded(Some(" 45 "), 30, MAX_SESSION_TTL_MINUTES), 45);
    }

    #[test]
    fn test_bounded_falls_back_to_default() {
        assert_eq!(bounded(None, 30, MAX_SESSION_TTL_MINUTES), 30);
        assert_eq!(bounded(Some("0"), 30, MAX_SESSION_TTL_MINUTES), 30);
        assert_eq!(bounded(Some("-5"), 30, MAX_SESSION_TTL_MINUTES), 30);
        assert_eq!(bounded(Some("soon"), 7, MAX_BOOKING_HORIZON_DAYS), 7);
    }
}
