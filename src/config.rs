use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::session::DEFAULT_RECENT_WINDOW;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub redis_url: String,
    pub bind_addr: String,
    pub cache_ttl_secs: u64,
    /// Simulated origin query delay, inclusive
    pub origin_delay_ms: RangeInclusive<u64>,
    pub catalog_size: usize,
    pub recent_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379/".into(),
            bind_addr: "0.0.0.0:3000".into(),
            cache_ttl_secs: 600,
            origin_delay_ms: 100..=500,
            catalog_size: 8,
            recent_window: DEFAULT_RECENT_WINDOW,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by any `LAB_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let delay_min = parse(&lookup, "LAB_ORIGIN_DELAY_MIN_MS", *defaults.origin_delay_ms.start())?;
        let delay_max = parse(&lookup, "LAB_ORIGIN_DELAY_MAX_MS", *defaults.origin_delay_ms.end())?;
        if delay_min > delay_max {
            return Err(ConfigError::Invalid {
                key: "LAB_ORIGIN_DELAY_MAX_MS",
                value: delay_max.to_string(),
                reason: format!("must be >= LAB_ORIGIN_DELAY_MIN_MS ({delay_min})"),
            });
        }

        let config = Self {
            redis_url: lookup("LAB_REDIS_URL").unwrap_or(defaults.redis_url),
            bind_addr: lookup("LAB_BIND_ADDR").unwrap_or(defaults.bind_addr),
            cache_ttl_secs: parse(&lookup, "LAB_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            origin_delay_ms: delay_min..=delay_max,
            catalog_size: parse(&lookup, "LAB_CATALOG_SIZE", defaults.catalog_size)?,
            recent_window: parse(&lookup, "LAB_RECENT_WINDOW", defaults.recent_window)?,
        };

        require_positive("LAB_CACHE_TTL_SECS", config.cache_ttl_secs as usize)?;
        require_positive("LAB_CATALOG_SIZE", config.catalog_size)?;
        Ok(config)
    }

    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = url.into();
        self
    }

    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    pub fn with_origin_delay_ms(mut self, delay: RangeInclusive<u64>) -> Self {
        self.origin_delay_ms = delay;
        self
    }

    pub fn with_catalog_size(mut self, size: usize) -> Self {
        self.catalog_size = size;
        self
    }

    pub fn with_recent_window(mut self, n: usize) -> Self {
        self.recent_window = n;
        self
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn require_positive(key: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: "0".into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(())
}
