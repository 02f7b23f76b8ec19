//! Runner configuration from environment variables.

use std::path::PathBuf;

use crate::types::DEFAULT_TICK_MS;

/// Driver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Interval between clock ticks fed to the session
    pub tick_ms: u32,
    /// Fixed shuffle seed; OS entropy when unset
    pub seed: Option<u64>,
    /// JSON card fixture; the demo catalog when unset
    pub catalog_path: Option<PathBuf>,
    /// User to register and log in at startup
    pub user: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            seed: None,
            catalog_path: None,
            user: None,
        }
    }
}

impl DriverConfig {
    /// Read `MEMORY_MATCH_TICK_MS`, `MEMORY_MATCH_SEED`, `MEMORY_MATCH_CATALOG`
    /// and `MEMORY_MATCH_USER`
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to defaults
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let tick_ms = non_empty("MEMORY_MATCH_TICK_MS")
            .and_then(|s| s.parse().ok())
            .filter(|&ms: &u32| ms > 0)
            .unwrap_or(DEFAULT_TICK_MS);

        let seed = non_empty("MEMORY_MATCH_SEED").and_then(|s| s.parse().ok());

        Self {
            tick_ms,
            seed,
            catalog_path: non_empty("MEMORY_MATCH_CATALOG").map(PathBuf::from),
            user: non_empty("MEMORY_MATCH_USER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> DriverConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DriverConfig::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(vars(&[]), DriverConfig::default());
        assert_eq!(DriverConfig::default().tick_ms, DEFAULT_TICK_MS);
    }

    #[test]
    fn test_reads_all_keys() {
        let config = vars(&[
            ("MEMORY_MATCH_TICK_MS", "50"),
            ("MEMORY_MATCH_SEED", "1234"),
            ("MEMORY_MATCH_CATALOG", "cards.json"),
            ("MEMORY_MATCH_USER", " ana "),
        ]);
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.catalog_path, Some(PathBuf::from("cards.json")));
        assert_eq!(config.user.as_deref(), Some("ana"));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = vars(&[
            ("MEMORY_MATCH_TICK_MS", "0"),
            ("MEMORY_MATCH_SEED", "abc"),
            ("MEMORY_MATCH_USER", "   "),
        ]);
        assert_eq!(config.tick_ms, DEFAULT_TICK_MS);
        assert_eq!(config.seed, None);
        assert_eq!(config.user, None);
    }
}
