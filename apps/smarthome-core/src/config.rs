//! Application configuration.

use std::{env, path::PathBuf};

/// Where the stores keep their records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Records live in process memory and vanish on exit.
    Memory,
    /// One file per record under the given directory.
    File(PathBuf),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage medium shared by both stores.
    pub storage: StorageBackend,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Whether the default catalog is written on first run.
    pub seed_catalog: bool,
}

impl Config {
    /// Loads configuration from environment variables, reading `.env` first
    /// if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds configuration from a variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let in_memory = var("SMARTHOME_IN_MEMORY")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        let storage = if in_memory {
            StorageBackend::Memory
        } else {
            let dir = match var("SMARTHOME_DATA_DIR") {
                Some(dir) => PathBuf::from(dir),
                None => dirs::home_dir()
                    .map(|home| home.join(".smarthome"))
                    .ok_or_else(|| {
                        anyhow::anyhow!("SMARTHOME_DATA_DIR is required when no home directory exists")
                    })?,
            };
            StorageBackend::File(dir)
        };

        Ok(Self {
            storage,
            log_level: var("SMARTHOME_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            seed_catalog: var("SMARTHOME_SEED_CATALOG")
                .map(|v| is_truthy(&v))
                .unwrap_or(true),
        })
    }

    /// Returns an in-memory configuration.
    pub fn in_memory() -> Self {
        Self {
            storage: StorageBackend::Memory,
            log_level: "info".to_string(),
            seed_catalog: true,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_explicit_data_dir() {
        let config = Config::from_vars(lookup(&[
            ("SMARTHOME_DATA_DIR", "/tmp/smarthome"),
            ("SMARTHOME_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(
            config.storage,
            StorageBackend::File(PathBuf::from("/tmp/smarthome"))
        );
        assert_eq!(config.log_level, "debug");
        assert!(config.seed_catalog);
    }

    #[test]
    fn test_in_memory_wins_over_data_dir() {
        let config = Config::from_vars(lookup(&[
            ("SMARTHOME_IN_MEMORY", "TRUE"),
            ("SMARTHOME_DATA_DIR", "/tmp/smarthome"),
            ("SMARTHOME_SEED_CATALOG", "0"),
        ]))
        .unwrap();

        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.log_level, "info");
        assert!(!config.seed_catalog);
    }
}
