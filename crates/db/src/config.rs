//! Warehouse configuration, resolved once at process start.

use std::fmt;
use std::str::FromStr;

/// Deployment environment the warehouse connection targets.
///
/// Selects which schemas (`dataset`/`raw_dataset`) queries run against; the
/// same SQL templates serve every environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Test,
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Test => "test",
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }

    /// Default curated-data schema for this environment.
    fn default_dataset(self) -> &'static str {
        match self {
            Environment::Test => "bgg_test",
            Environment::Dev => "bgg_dev",
            Environment::Prod => "bgg",
        }
    }

    /// Default raw/bookkeeping schema for this environment.
    fn default_raw_dataset(self) -> &'static str {
        match self {
            Environment::Test => "bgg_test_raw",
            Environment::Dev => "bgg_dev_raw",
            Environment::Prod => "bgg_raw",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(format!("unknown environment '{other}' (expected test|dev|prod)")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Warehouse connection and caching configuration.
///
/// All fields except the connection URL have sensible defaults; in
/// production, override via environment variables.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Target environment (default: `dev`).
    pub environment: Environment,
    /// Connection URL for the warehouse.
    pub database_url: String,
    /// Schema holding the curated game tables.
    pub dataset: String,
    /// Schema holding raw/bookkeeping tables (search log).
    pub raw_dataset: String,
    /// Connection pool size (default: `20`).
    pub max_connections: u32,
    /// Pool acquire timeout in seconds (default: `30`).
    pub acquire_timeout_secs: u64,
    /// Result cache TTL in seconds (default: `14400`, four hours; catalog
    /// data changes infrequently).
    pub cache_ttl_secs: u64,
}

impl WarehouseConfig {
    /// Build a configuration programmatically with per-environment defaults.
    pub fn new(environment: Environment, database_url: impl Into<String>) -> Self {
        WarehouseConfig {
            environment,
            database_url: database_url.into(),
            dataset: environment.default_dataset().to_string(),
            raw_dataset: environment.default_raw_dataset().to_string(),
            max_connections: 20,
            acquire_timeout_secs: 30,
            cache_ttl_secs: 14_400,
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `WAREHOUSE_ENV`               | `dev`                   |
    /// | `DATABASE_URL`                | (required)              |
    /// | `WAREHOUSE_DATASET`           | per-environment         |
    /// | `WAREHOUSE_RAW_DATASET`       | per-environment         |
    /// | `WAREHOUSE_MAX_CONNECTIONS`   | `20`                    |
    /// | `WAREHOUSE_ACQUIRE_TIMEOUT_SECS` | `30`                 |
    /// | `WAREHOUSE_CACHE_TTL_SECS`    | `14400`                 |
    ///
    /// Panics on a missing `DATABASE_URL` or malformed numeric value, which
    /// is the desired behaviour at process start.
    pub fn from_env() -> Self {
        let environment: Environment = std::env::var("WAREHOUSE_ENV")
            .unwrap_or_else(|_| "dev".into())
            .parse()
            .expect("WAREHOUSE_ENV must be test, dev, or prod");

        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let mut config = WarehouseConfig::new(environment, database_url);

        if let Ok(dataset) = std::env::var("WAREHOUSE_DATASET") {
            config.dataset = dataset;
        }
        if let Ok(raw_dataset) = std::env::var("WAREHOUSE_RAW_DATASET") {
            config.raw_dataset = raw_dataset;
        }
        if let Ok(value) = std::env::var("WAREHOUSE_MAX_CONNECTIONS") {
            config.max_connections = value
                .parse()
                .expect("WAREHOUSE_MAX_CONNECTIONS must be a valid u32");
        }
        if let Ok(value) = std::env::var("WAREHOUSE_ACQUIRE_TIMEOUT_SECS") {
            config.acquire_timeout_secs = value
                .parse()
                .expect("WAREHOUSE_ACQUIRE_TIMEOUT_SECS must be a valid u64");
        }
        if let Ok(value) = std::env::var("WAREHOUSE_CACHE_TTL_SECS") {
            config.cache_ttl_secs = value
                .parse()
                .expect("WAREHOUSE_CACHE_TTL_SECS must be a valid u64");
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("Test".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!(" prod ".parse::<Environment>().unwrap(), Environment::Prod);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn datasets_differ_per_environment() {
        let test = WarehouseConfig::new(Environment::Test, "postgres://localhost/warehouse");
        let prod = WarehouseConfig::new(Environment::Prod, "postgres://localhost/warehouse");
        assert_eq!(test.dataset, "bgg_test");
        assert_eq!(prod.dataset, "bgg");
        assert_ne!(test.raw_dataset, prod.raw_dataset);
    }
}
