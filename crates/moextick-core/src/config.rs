use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::ValidationError;

pub const DEFAULT_BASE_URL: &str = "https://iss.moex.com/iss";
pub const DEFAULT_USER_AGENT: &str = concat!("moextick/", env!("CARGO_PKG_VERSION"));

const ENV_BASE_URL: &str = "MOEX_BASE_URL";
const ENV_TIMEOUT_MS: &str = "MOEX_TIMEOUT_MS";
const ENV_USER_AGENT: &str = "MOEX_USER_AGENT";
const ENV_PRICE_TTL_SECS: &str = "MOEX_PRICE_TTL_SECS";
const ENV_SEARCH_TTL_SECS: &str = "MOEX_SEARCH_TTL_SECS";
const ENV_CACHE_MAX_SIZE: &str = "MOEX_CACHE_MAX_SIZE";
const ENV_CACHE_ENABLED: &str = "MOEX_CACHE_ENABLED";
const ENV_SHARE_BOARDS: &str = "MOEX_SHARE_BOARDS";
const ENV_BOND_BOARDS: &str = "MOEX_BOND_BOARDS";

/// Client settings, built once and handed to [`crate::MoexClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
    /// TTL for share and bond records.
    pub price_ttl: Duration,
    /// TTL for search result lists.
    pub search_ttl: Duration,
    /// Per-cache entry limit; `None` disables LRU eviction.
    pub cache_max_size: Option<usize>,
    /// `false` swaps every cache for [`crate::NullCache`].
    pub cache_enabled: bool,
    /// Preferred share boards, most preferred first.
    pub share_boards: Vec<String>,
    /// Preferred bond boards, most preferred first.
    pub bond_boards: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: 10_000,
            user_agent: String::from(DEFAULT_USER_AGENT),
            price_ttl: Duration::from_secs(60),
            search_ttl: Duration::from_secs(300),
            cache_max_size: Some(1000),
            cache_enabled: true,
            share_boards: boards(&["TQBR", "TQTF"]),
            bond_boards: boards(&["TQOB", "TQCB", "TQIR"]),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `MOEX_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfig`] for a value that does not
    /// parse.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with a caller-supplied variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_owned())
                .filter(|raw| !raw.is_empty())
        };

        if let Some(base_url) = value(ENV_BASE_URL) {
            config.base_url = base_url.trim_end_matches('/').to_owned();
        }
        if let Some(raw) = value(ENV_TIMEOUT_MS) {
            config.timeout_ms = parse(ENV_TIMEOUT_MS, &raw)?;
        }
        if let Some(user_agent) = value(ENV_USER_AGENT) {
            config.user_agent = user_agent;
        }
        if let Some(raw) = value(ENV_PRICE_TTL_SECS) {
            config.price_ttl = Duration::from_secs(parse(ENV_PRICE_TTL_SECS, &raw)?);
        }
        if let Some(raw) = value(ENV_SEARCH_TTL_SECS) {
            config.search_ttl = Duration::from_secs(parse(ENV_SEARCH_TTL_SECS, &raw)?);
        }
        if let Some(raw) = value(ENV_CACHE_MAX_SIZE) {
            let max_size: usize = parse(ENV_CACHE_MAX_SIZE, &raw)?;
            config.cache_max_size = (max_size > 0).then_some(max_size);
        }
        if let Some(raw) = value(ENV_CACHE_ENABLED) {
            config.cache_enabled = parse_flag(ENV_CACHE_ENABLED, &raw)?;
        }
        if let Some(raw) = value(ENV_SHARE_BOARDS) {
            config.share_boards = parse_boards(ENV_SHARE_BOARDS, &raw)?;
        }
        if let Some(raw) = value(ENV_BOND_BOARDS) {
            config.bond_boards = parse_boards(ENV_BOND_BOARDS, &raw)?;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_cache_enabled(mut self, cache_enabled: bool) -> Self {
        self.cache_enabled = cache_enabled;
        self
    }

    pub fn price_cache(&self) -> CacheConfig {
        CacheConfig::new(self.price_ttl, self.cache_max_size)
    }

    pub fn search_cache(&self) -> CacheConfig {
        CacheConfig::new(self.search_ttl, self.cache_max_size)
    }
}

fn boards(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}

fn parse<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ValidationError> {
    raw.parse().map_err(|_| ValidationError::InvalidConfig {
        key,
        value: raw.to_owned(),
    })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ValidationError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ValidationError::InvalidConfig {
            key,
            value: raw.to_owned(),
        }),
    }
}

fn parse_boards(key: &'static str, raw: &str) -> Result<Vec<String>, ValidationError> {
    let boards = raw
        .split(',')
        .map(|board| board.trim().to_ascii_uppercase())
        .filter(|board| !board.is_empty())
        .collect::<Vec<_>>();
    if boards.is_empty() {
        return Err(ValidationError::InvalidConfig {
            key,
            value: raw.to_owned(),
        });
    }
    Ok(boards)
}
