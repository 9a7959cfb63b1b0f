//! Where a dataset comes from and where its local copy lives.

use std::path::PathBuf;

const CRASHES_URL: &str = "https://data.cityofchicago.org/api/views/85ca-t3if/rows.csv?accessType=DOWNLOAD";
const CRASHES_CACHE: &str = "assets/data/chicago_traffic_crashes.csv";

const CAMERAS_URL: &str = "https://data.cityofchicago.org/api/views/hhkd-xvj4/rows.csv?accessType=DOWNLOAD";
const CAMERAS_CACHE: &str = "assets/data/chicago_red_light_cameras.csv";

const ENV_URL: &str = "CRASH_DATA_URL";
const ENV_CACHE: &str = "CRASH_DATA_CACHE";

/// A remote CSV resource and its local cache path.
///
/// Passed explicitly to the fetcher and the pipeline; there is no process-wide
/// default beyond the constructors below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub url: String,
    pub cache_path: PathBuf,
}

impl DatasetConfig {
    pub fn new(url: impl Into<String>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            cache_path: cache_path.into(),
        }
    }

    /// Chicago traffic crashes.
    pub fn crashes() -> Self {
        Self::new(CRASHES_URL, CRASHES_CACHE)
    }

    /// Chicago red-light camera violations.
    pub fn red_light_cameras() -> Self {
        Self::new(CAMERAS_URL, CAMERAS_CACHE)
    }

    /// Apply `CRASH_DATA_URL` / `CRASH_DATA_CACHE` (from the environment or a
    /// `.env` file) on top of `defaults`.
    pub fn from_env(defaults: Self) -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(defaults, |key| std::env::var(key).ok())
    }

    fn from_lookup(mut defaults: Self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.trim().is_empty()) {
            defaults.url = url;
        }
        if let Some(path) = lookup(ENV_CACHE).filter(|v| !v.trim().is_empty()) {
            defaults.cache_path = PathBuf::from(path);
        }
        defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_overrides_defaults() {
        let cfg = DatasetConfig::from_lookup(DatasetConfig::crashes(), |key| match key {
            "CRASH_DATA_URL" => Some("https://example.test/c.csv".to_string()),
            "CRASH_DATA_CACHE" => Some("/tmp/c.csv".to_string()),
            _ => None,
        });
        assert_eq!(cfg.url, "https://example.test/c.csv");
        assert_eq!(cfg.cache_path, PathBuf::from("/tmp/c.csv"));
    }

    #[test]
    fn blank_values_keep_defaults() {
        let cfg = DatasetConfig::from_lookup(DatasetConfig::red_light_cameras(), |_| Some("  ".to_string()));
        assert_eq!(cfg, DatasetConfig::red_light_cameras());
    }
}
