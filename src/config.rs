use anyhow::{Context, Result, anyhow, bail};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    MySql { database_url: String, run_migrations: bool },
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Azure {
        account: String,
        container: String,
        sas_token: String,
    },
    Local {
        root: PathBuf,
        public_base_url: String,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub store: StoreBackend,
    pub storage: StorageBackend,

    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_per_min: u32,

    // Leave rules and uploads
    pub medical_document_threshold_days: u32,
    pub max_document_bytes: usize,
    pub orphan_upload_ttl: Duration,
    pub orphan_sweep_interval: Duration,
}

/// Reads a typed variable, falling back to `default` when unset.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has invalid value '{}': {}", key, raw, e)),
        None => Ok(default),
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{} must be set", key))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("STORE_BACKEND").as_deref().unwrap_or("mysql") {
            "mysql" => StoreBackend::MySql {
                database_url: required(&lookup, "DATABASE_URL")?,
                run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
            },
            "memory" => StoreBackend::Memory,
            other => bail!("STORE_BACKEND must be 'mysql' or 'memory', got '{}'", other),
        };

        let storage = match lookup("STORAGE_BACKEND").as_deref().unwrap_or("azure") {
            "azure" => StorageBackend::Azure {
                account: required(&lookup, "AZURE_STORAGE_ACCOUNT")?,
                container: required(&lookup, "AZURE_STORAGE_CONTAINER")?,
                sas_token: required(&lookup, "AZURE_STORAGE_SAS_TOKEN")?,
            },
            "local" => StorageBackend::Local {
                root: PathBuf::from(
                    lookup("LOCAL_STORAGE_DIR").unwrap_or_else(|| "uploads".to_string()),
                ),
                public_base_url: lookup("LOCAL_STORAGE_BASE_URL")
                    .unwrap_or_else(|| "http://localhost:8080/files".to_string()),
            },
            other => bail!("STORAGE_BACKEND must be 'azure' or 'local', got '{}'", other),
        };

        Ok(Self {
            server_addr: required(&lookup, "SERVER_ADDR")?,
            store,
            storage,
            api_prefix: lookup("API_PREFIX").unwrap_or_default(),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            rate_per_min: parse_or(&lookup, "RATE_PER_MIN", 1000)?,
            medical_document_threshold_days: parse_or(
                &lookup,
                "MEDICAL_DOCUMENT_THRESHOLD_DAYS",
                2,
            )?,
            max_document_bytes: parse_or(&lookup, "MAX_DOCUMENT_BYTES", 10 * 1024 * 1024)?,
            orphan_upload_ttl: Duration::from_secs(parse_or(
                &lookup,
                "ORPHAN_UPLOAD_TTL_SECS",
                900,
            )?),
            orphan_sweep_interval: Duration::from_secs(parse_or(
                &lookup,
                "ORPHAN_SWEEP_INTERVAL_SECS",
                60,
            )?),
        })
    }
}
