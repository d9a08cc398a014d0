use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{bail, Context};

use crate::external::yahoo::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    Mock,
}

impl ProviderKind {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "mock" => Ok(ProviderKind::Mock),
            other => bail!("Invalid MARKET_DATA_PROVIDER: {}. Must be 'yahoo' or 'mock'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub provider: ProviderKind,
    pub yahoo_base_url: String,
    pub provider_timeout: Option<Duration>,
    // Tickers the mock provider reports as missing.
    pub mock_unavailable_tickers: Vec<String>,
    pub history_days: u32,
    pub export_cache_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            provider: ProviderKind::Yahoo,
            yahoo_base_url: DEFAULT_BASE_URL.to_string(),
            provider_timeout: None,
            mock_unavailable_tickers: Vec::new(),
            history_days: 365,
            export_cache_capacity: 32,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = match lookup("HOST") {
            Some(raw) => raw.parse::<IpAddr>().with_context(|| format!("Invalid HOST: {}", raw))?,
            None => defaults.host,
        };
        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().with_context(|| format!("Invalid PORT: {}", raw))?,
            None => defaults.port,
        };
        let provider = match lookup("MARKET_DATA_PROVIDER") {
            Some(raw) => ProviderKind::parse(&raw)?,
            None => defaults.provider,
        };
        let provider_timeout = match lookup("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(
                raw.parse::<u64>()
                    .with_context(|| format!("Invalid PROVIDER_TIMEOUT_SECS: {}", raw))?,
            )),
            None => defaults.provider_timeout,
        };
        let history_days = match lookup("HISTORY_DAYS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("Invalid HISTORY_DAYS: {}", raw))?,
            None => defaults.history_days,
        };
        let export_cache_capacity = match lookup("EXPORT_CACHE_CAPACITY") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("Invalid EXPORT_CACHE_CAPACITY: {}", raw))?,
            None => defaults.export_cache_capacity,
        };

        let mock_unavailable_tickers = match lookup("MOCK_UNAVAILABLE_TICKERS") {
            Some(raw) => raw
                .split(',')
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
            None => defaults.mock_unavailable_tickers,
        };

        let config = Self {
            host,
            port,
            provider,
            yahoo_base_url: lookup("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
            provider_timeout,
            mock_unavailable_tickers,
            history_days,
            export_cache_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.history_days == 0 {
            bail!("HISTORY_DAYS must be at least 1");
        }
        if self.export_cache_capacity == 0 {
            bail!("EXPORT_CACHE_CAPACITY must be at least 1");
        }
        url::Url::parse(&self.yahoo_base_url)
            .with_context(|| format!("Invalid YAHOO_BASE_URL: {}", self.yahoo_base_url))?;
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
