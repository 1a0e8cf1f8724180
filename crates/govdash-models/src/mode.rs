use serde::{Deserialize, Serialize};

/// Environment variable that selects the runtime mode.
pub const RUNTIME_MODE_ENV: &str = "GOVDASH_ENV";

/// Development relaxes outbound TLS verification and raises log verbosity.
/// Anything that is not explicitly development runs as production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Development,
    #[default]
    Production,
}

impl RuntimeMode {
    pub fn from_env() -> Self {
        std::env::var(RUNTIME_MODE_ENV)
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => RuntimeMode::Development,
            _ => RuntimeMode::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, RuntimeMode::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeMode::Development => "development",
            RuntimeMode::Production => "production",
        }
    }
}
