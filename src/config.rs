use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::chart::payload::PayloadFormat;

/// Hub configuration derived from environment variables.
///
/// `DATABASE_URL` has no default: a missing connection string is a startup
/// error rather than a silent fallback.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub bind: String,
    pub port: u16,

    // ── Record store ───────────────────────────────────────────────
    pub database_url: String,
    pub database_name: String,
    pub db_pool_size: u32,
    pub query_timeout: Duration,

    // ── Presentation ───────────────────────────────────────────────
    pub chart_format: PayloadFormat,
    pub environment: String,
}

/// Startup configuration problem.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { name: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "{name} must be set"),
            Self::Invalid { name, value } => write!(f, "{name} has invalid value {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Reads variables through `lookup`, treating blank values as unset.
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn str_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed_or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value: raw }),
        }
    }
}

impl HubConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let db_pool_size: u32 = vars.parsed_or("CHART_HUB_DB_POOL_SIZE", 4)?;
        if db_pool_size == 0 {
            return Err(ConfigError::Invalid {
                name: "CHART_HUB_DB_POOL_SIZE",
                value: "0".to_string(),
            });
        }

        let query_timeout_ms: u64 = vars.parsed_or("CHART_HUB_QUERY_TIMEOUT_MS", 10_000)?;
        if query_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "CHART_HUB_QUERY_TIMEOUT_MS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bind: vars.str_or("CHART_HUB_BIND", "0.0.0.0"),
            port: vars.parsed_or("PORT", 3000)?,
            database_url: vars.required("DATABASE_URL")?,
            database_name: vars.str_or("DATABASE_NAME", "GKI"),
            db_pool_size,
            query_timeout: Duration::from_millis(query_timeout_ms),
            chart_format: vars.parsed_or("CHART_HUB_FORMAT", PayloadFormat::ChartLibrary)?,
            environment: vars.str_or("CHART_HUB_ENV", "development"),
        })
    }
}
