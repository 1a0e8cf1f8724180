use anyhow::{Context, Result};
use govdash_core::{AppConfig, PollerConfig, RetryPolicy};
use govdash_models::{ProposalFilter, RuntimeMode};
use govdash_upstream::UpstreamConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamSection,
    pub poller: PollerSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamSection {
    pub url: String,
    pub default_limit: String,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            url: govdash_upstream::DEFAULT_PROPOSALS_URL.to_string(),
            default_limit: govdash_upstream::DEFAULT_LIMIT.to_string(),
            user_agent: None,
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerSection {
    pub proxy_url: String,
    pub limit: u32,
    pub interval_seconds: u64,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub filter: ProposalFilter,
}

impl Default for PollerSection {
    fn default() -> Self {
        let poller = PollerConfig::default();
        Self {
            proxy_url: "http://127.0.0.1:8080".to_string(),
            limit: poller.limit,
            interval_seconds: poller.interval.as_secs(),
            max_attempts: poller.retry.max_attempts,
            base_delay_ms: poller.retry.base_delay.as_millis() as u64,
            filter: poller.filter,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            tracing::info!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::parse(&raw).with_context(|| format!("Failed to parse config file {:?}", path))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn upstream_config(&self) -> UpstreamConfig {
        let defaults = UpstreamConfig::default();
        UpstreamConfig {
            proposals_url: self.upstream.url.clone(),
            user_agent: self
                .upstream
                .user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
            timeout: self.upstream.timeout_seconds.map(Duration::from_secs),
        }
    }

    pub fn app_config(&self, mode: RuntimeMode) -> AppConfig {
        AppConfig {
            mode,
            default_limit: self.upstream.default_limit.clone(),
            allowed_origins: self.server.allowed_origins.clone(),
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            limit: self.poller.limit,
            // tokio intervals panic on a zero period
            interval: Duration::from_secs(self.poller.interval_seconds.max(1)),
            retry: RetryPolicy {
                max_attempts: self.poller.max_attempts.max(1),
                base_delay: Duration::from_millis(self.poller.base_delay_ms),
            },
            filter: self.poller.filter,
        }
    }
}
