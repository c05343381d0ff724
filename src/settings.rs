use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeedError};
use crate::models::CustomerPool;
use crate::seed::DEMO_USERS;

/// What to do with a row whose customer id is not in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CustomerPolicy {
    /// Substitute a uniformly random member of the pool.
    #[default]
    Random,
    /// Skip the row.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_transactions_collection")]
    pub transactions_collection: String,
    #[serde(default = "default_customer_pool")]
    pub customer_pool: Vec<String>,
    #[serde(default)]
    pub customer_policy: CustomerPolicy,
    /// Extra header fragments per logical field, e.g. `{"amount": ["amt"]}`.
    #[serde(default)]
    pub column_aliases: BTreeMap<String, Vec<String>>,
}

fn default_mongodb_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "financedb".to_string()
}

fn default_transactions_collection() -> String {
    "transactions".to_string()
}

fn default_customer_pool() -> Vec<String> {
    DEMO_USERS.iter().map(|id| id.to_hex()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mongodb_uri: default_mongodb_uri(),
            database: default_database(),
            transactions_collection: default_transactions_collection(),
            customer_pool: default_customer_pool(),
            customer_policy: CustomerPolicy::default(),
            column_aliases: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Parse the configured pool. Bad hex is fatal, and so is an empty pool
    /// when unknown customers are meant to be replaced from it.
    pub fn customer_pool(&self) -> Result<CustomerPool> {
        let ids = self
            .customer_pool
            .iter()
            .map(|raw| {
                ObjectId::parse_str(raw.trim()).map_err(|e| {
                    SeedError::Settings(format!("invalid customer id {raw:?} in customer_pool: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let pool = CustomerPool::new(ids);
        if pool.is_empty() && self.customer_policy == CustomerPolicy::Random {
            return Err(SeedError::Settings(
                "customer_pool is empty but customer_policy is \"random\"".to_string(),
            ));
        }
        Ok(pool)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("finseed")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Load settings from `path`, or from the default location. A missing file
/// yields defaults; a file that does not parse is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(settings_path);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(&path)?;
    serde_json::from_str(&content)
        .map_err(|e| SeedError::Settings(format!("{}: {e}", path.display())))
}

pub fn save_settings(settings: &Settings, path: Option<&Path>) -> Result<PathBuf> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(settings_path);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SeedError::Settings(e.to_string()))?;
    std::fs::write(&path, format!("{json}\n"))?;
    Ok(path)
}
