//! Configuration layer: typed settings with layered precedence (file → env).
//!
//! Sources are an optional `foglio.toml` next to the process plus
//! `FOGLIO`-prefixed environment variables (`FOGLIO__API__BASE_URL`,
//! `FOGLIO__CACHE__TTL_SECONDS`, ...). Settings are resolved once and handed
//! to [`crate::client::ContentClient::new`]; nothing mutates them afterwards.

use std::num::{NonZeroU64, NonZeroUsize};
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::cache::CacheConfig;

const LOCAL_CONFIG_BASENAME: &str = "foglio";
const ENV_PREFIX: &str = "FOGLIO";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 100;
const DEFAULT_MONTHLY_LIMIT: u64 = 100_000;

/// Fully-resolved client settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub http: HttpSettings,
    pub cache: CacheSettings,
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL of the remote content API, e.g. `https://cms.example.com`.
    pub base_url: Url,
    /// Bearer token; unauthenticated requests are sent when absent.
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl: Duration,
    pub max_entries: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub monthly_limit: NonZeroU64,
}

impl Settings {
    /// Settings for the given base URL with every other knob at its default.
    pub fn for_base_url(base_url: Url) -> Self {
        Self {
            api: ApiSettings {
                base_url,
                token: None,
            },
            http: HttpSettings {
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
            cache: CacheSettings {
                enabled: true,
                ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
                max_entries: NonZeroUsize::new(DEFAULT_CACHE_MAX_ENTRIES)
                    .unwrap_or(NonZeroUsize::MIN),
            },
            rate_limit: RateLimitSettings {
                monthly_limit: NonZeroU64::new(DEFAULT_MONTHLY_LIMIT).unwrap_or(NonZeroU64::MIN),
            },
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl: settings.ttl,
            max_entries: settings.max_entries.get(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings from the default sources.
pub fn load() -> Result<Settings, LoadError> {
    load_from(None)
}

/// Load settings, optionally forcing an explicit configuration file.
pub fn load_from(path: Option<&Path>) -> Result<Settings, LoadError> {
    let mut builder =
        Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let raw: RawSettings = builder.build()?.try_deserialize()?;
    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    http: RawHttpSettings,
    cache: RawCacheSettings,
    rate_limit: RawRateLimitSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawHttpSettings {
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    ttl_seconds: Option<u64>,
    max_entries: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRateLimitSettings {
    monthly_limit: Option<u64>,
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            api,
            http,
            cache,
            rate_limit,
        } = raw;

        Ok(Self {
            api: build_api_settings(api)?,
            http: build_http_settings(http)?,
            cache: build_cache_settings(cache)?,
            rate_limit: build_rate_limit_settings(rate_limit)?,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let base_url = api
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LoadError::invalid("api.base_url", "must be set"))?;
    let base_url = Url::parse(base_url)
        .map_err(|err| LoadError::invalid("api.base_url", format!("failed to parse: {err}")))?;

    let token = api.token.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    Ok(ApiSettings { base_url, token })
}

fn build_http_settings(http: RawHttpSettings) -> Result<HttpSettings, LoadError> {
    let timeout_secs = http.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "http.timeout_seconds",
            "must be greater than zero",
        ));
    }
    Ok(HttpSettings {
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let enabled = cache.enabled.unwrap_or(true);

    let ttl_secs = cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS);
    if ttl_secs == 0 {
        return Err(LoadError::invalid(
            "cache.ttl_seconds",
            "must be greater than zero",
        ));
    }

    let max_entries_value = cache.max_entries.unwrap_or(DEFAULT_CACHE_MAX_ENTRIES);
    let max_entries = NonZeroUsize::new(max_entries_value)
        .ok_or_else(|| LoadError::invalid("cache.max_entries", "must be greater than zero"))?;

    Ok(CacheSettings {
        enabled,
        ttl: Duration::from_secs(ttl_secs),
        max_entries,
    })
}

fn build_rate_limit_settings(
    rate_limit: RawRateLimitSettings,
) -> Result<RateLimitSettings, LoadError> {
    let monthly_limit_value = rate_limit.monthly_limit.unwrap_or(DEFAULT_MONTHLY_LIMIT);
    let monthly_limit = NonZeroU64::new(monthly_limit_value).ok_or_else(|| {
        LoadError::invalid("rate_limit.monthly_limit", "must be greater than zero")
    })?;

    Ok(RateLimitSettings { monthly_limit })
}
