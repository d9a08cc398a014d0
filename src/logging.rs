use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

const DEFAULT_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, taken from `RUST_LOG`.
    pub filter: String,
    /// Where to ship logs when `LOKI_ENABLED` is set.
    pub loki: Option<LokiTarget>,
}

#[derive(Debug, Clone)]
pub struct LokiTarget {
    pub url: Url,
    pub service: String,
    pub environment: String,
}

impl LoggingConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let loki_enabled = lookup("LOKI_ENABLED")
            .is_some_and(|raw| matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes"));

        let loki = if loki_enabled {
            let raw = lookup("LOKI_URL").context("LOKI_ENABLED is set but LOKI_URL is not")?;
            Some(LokiTarget {
                url: Url::parse(&raw).with_context(|| format!("Invalid LOKI_URL: {}", raw))?,
                service: lookup("SERVICE_NAME").unwrap_or_else(|| "stock-tracker".to_string()),
                environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            })
        } else {
            None
        };

        Ok(Self {
            filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            loki,
        })
    }
}

/// Installs the global subscriber: console output always, plus a Loki layer
/// when one is configured and the `loki` feature is compiled in.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("Invalid RUST_LOG filter: {}", config.filter))?;
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    #[cfg(feature = "loki")]
    let registry = registry.with(loki_layer(config.loki.as_ref())?);

    registry.try_init().context("Logging is already initialized")?;

    match &config.loki {
        Some(loki) if cfg!(feature = "loki") => info!(
            "✅ Shipping {} ({}) logs to Loki at {}",
            loki.service, loki.environment, loki.url
        ),
        Some(_) => warn!("LOKI_ENABLED is set but the loki feature is not compiled in"),
        None => info!("📊 Console logging initialized"),
    }
    Ok(())
}

#[cfg(feature = "loki")]
fn loki_layer(target: Option<&LokiTarget>) -> anyhow::Result<Option<tracing_loki::Layer>> {
    let Some(target) = target else {
        return Ok(None);
    };

    let (layer, task) = tracing_loki::builder()
        .label("service", target.service.as_str())?
        .label("environment", target.environment.as_str())?
        .build_url(target.url.clone())?;

    // Ships buffered log lines to Loki in the background.
    tokio::spawn(task);
    Ok(Some(layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<LoggingConfig> {
        let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
        LoggingConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_to_console_only() {
        let config = config_from(&[("LOKI_URL", "http://localhost:3100")]).unwrap();
        assert_eq!(config.filter, DEFAULT_FILTER);
        assert!(config.loki.is_none());
    }

    #[test]
    fn test_loki_requires_valid_url() {
        assert!(config_from(&[("LOKI_ENABLED", "true")]).is_err());
        assert!(config_from(&[("LOKI_ENABLED", "true"), ("LOKI_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_loki_target_labels() {
        let config = config_from(&[
            ("LOKI_ENABLED", "TRUE"),
            ("LOKI_URL", "http://localhost:3100"),
            ("ENVIRONMENT", "staging"),
            ("RUST_LOG", "debug"),
        ])
        .unwrap();

        let loki = config.loki.unwrap();
        assert_eq!(loki.url.as_str(), "http://localhost:3100/");
        assert_eq!(loki.service, "stock-tracker");
        assert_eq!(loki.environment, "staging");
        assert_eq!(config.filter, "debug");
    }
}
