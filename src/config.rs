use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

// =============================================================================
// Time-related constants
// =============================================================================

/// Cache time-to-live in milliseconds (24 hours)
pub const DEFAULT_CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Timeout for resolving a single driver in milliseconds (15 seconds)
pub const DRIVER_TIMEOUT_MS: u64 = 15_000;

/// Timeout for resolving the whole batch in milliseconds (30 seconds)
pub const BATCH_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// Remote endpoints
// =============================================================================

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

pub const DEFAULT_WEB_BASE_URL: &str = "https://github.com";

pub const USER_AGENT: &str = concat!("driver-dashboard/", env!("CARGO_PKG_VERSION"));

/// Key under which the resolved batch is cached
pub const CACHE_KEY: &str = "drivers_dashboard_cache";

/// Environment variable holding the GitHub API token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Dashboard configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    pub github: GitHubConfig,
    pub timeouts: TimeoutConfig,
    pub cache: CacheConfig,
    /// JSON file mapping driver names to supported version lists
    pub supported_versions_path: Option<PathBuf>,
}

impl DashboardConfig {
    /// Load configuration from a JSON file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.timeouts.validate()?;
        Ok(config)
    }

    /// Prefer a token from the environment over the configured one
    pub fn with_env_token(mut self, env_token: Option<String>) -> Self {
        if let Some(token) = env_token.filter(|t| !t.is_empty()) {
            self.github.token = Some(token);
        }
        self
    }
}

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token: None,
        }
    }
}

/// Resolution timeouts in milliseconds
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeoutConfig {
    pub driver_ms: u64,
    pub batch_ms: u64,
}

impl TimeoutConfig {
    pub fn driver(&self) -> Duration {
        Duration::from_millis(self.driver_ms)
    }

    pub fn batch(&self) -> Duration {
        Duration::from_millis(self.batch_ms)
    }

    /// A driver timeout at or above the batch timeout would let one hung
    /// driver fail the whole batch.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.driver_ms == 0 || self.driver_ms >= self.batch_ms {
            anyhow::bail!(
                "Invalid timeouts: driverMs ({}) must be positive and less than batchMs ({})",
                self.driver_ms,
                self.batch_ms
            );
        }
        Ok(())
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            driver_ms: DRIVER_TIMEOUT_MS,
            batch_ms: BATCH_TIMEOUT_MS,
        }
    }
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Cache time-to-live in milliseconds
    pub ttl_ms: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }
}

/// Returns the path to the data directory for driver-dashboard.
/// Uses $XDG_DATA_HOME/driver-dashboard if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/driver-dashboard,
/// or ./driver-dashboard if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the cache database file.
pub fn db_path() -> PathBuf {
    data_dir().join("cache.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("driver-dashboard.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("driver-dashboard")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn dashboard_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<DashboardConfig>(json!({
            "timeouts": {
                "driverMs": 1000
            }
        }))
        .unwrap();

        assert_eq!(result.timeouts.driver_ms, 1000);
        assert_eq!(result.timeouts.batch_ms, BATCH_TIMEOUT_MS);
        assert_eq!(result.github, GitHubConfig::default());
        assert_eq!(result.cache, CacheConfig::default());
    }

    #[test]
    fn dashboard_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<DashboardConfig>(json!({
            "github": {
                "baseUrl": "http://localhost:8080",
                "token": "ghp_abc"
            },
            "timeouts": {
                "driverMs": 100,
                "batchMs": 200
            },
            "cache": {
                "ttlMs": 5000
            },
            "supportedVersionsPath": "/etc/supported.json"
        }))
        .unwrap();

        assert_eq!(
            result,
            DashboardConfig {
                github: GitHubConfig {
                    base_url: "http://localhost:8080".to_string(),
                    token: Some("ghp_abc".to_string()),
                },
                timeouts: TimeoutConfig {
                    driver_ms: 100,
                    batch_ms: 200,
                },
                cache: CacheConfig { ttl_ms: 5000 },
                supported_versions_path: Some(PathBuf::from("/etc/supported.json")),
            }
        );
    }

    #[test]
    fn with_env_token_overrides_configured_token() {
        let mut config = DashboardConfig::default();
        config.github.token = Some("from-file".to_string());

        let config = config.with_env_token(Some("from-env".to_string()));
        assert_eq!(config.github.token.as_deref(), Some("from-env"));

        let config = config.with_env_token(Some(String::new()));
        assert_eq!(config.github.token.as_deref(), Some("from-env"));
    }

    #[test]
    fn load_without_path_returns_defaults() {
        assert_eq!(DashboardConfig::load(None).unwrap(), DashboardConfig::default());
    }

    #[rstest]
    #[case(DRIVER_TIMEOUT_MS, BATCH_TIMEOUT_MS, true)]
    #[case(100, 200, true)]
    #[case(2000, 200, false)]
    #[case(200, 200, false)]
    #[case(0, 200, false)]
    fn timeout_config_requires_driver_below_batch(
        #[case] driver_ms: u64,
        #[case] batch_ms: u64,
        #[case] valid: bool,
    ) {
        let timeouts = TimeoutConfig {
            driver_ms,
            batch_ms,
        };
        assert_eq!(timeouts.validate().is_ok(), valid);
    }

    #[test]
    fn load_rejects_driver_timeout_above_batch_timeout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeouts":{"driverMs":2000,"batchMs":200}}"#).unwrap();

        let err = DashboardConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("driverMs (2000)"));
    }

    #[test]
    fn load_reads_valid_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeouts":{"driverMs":100,"batchMs":200}}"#).unwrap();

        let config = DashboardConfig::load(Some(&path)).unwrap();
        assert_eq!(config.timeouts.driver(), Duration::from_millis(100));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/driver-dashboard"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/driver-dashboard"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./driver-dashboard"));
    }
}
