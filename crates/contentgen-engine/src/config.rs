use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_S: f64 = 300.0;
const MIN_TIMEOUT_S: f64 = 5.0;
const MAX_TIMEOUT_S: f64 = 900.0;

/// Where the generation service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub timeout_s: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_s: DEFAULT_TIMEOUT_S,
        }
    }
}

impl ClientConfig {
    /// Reads `CONTENTGEN_API_BASE` and `CONTENTGEN_TIMEOUT_S`; blank values count as unset.
    pub fn from_env() -> Self {
        Self::default()
            .with_api_base(non_empty_env("CONTENTGEN_API_BASE"))
            .with_timeout(
                non_empty_env("CONTENTGEN_TIMEOUT_S").and_then(|raw| raw.parse::<f64>().ok()),
            )
    }

    pub fn with_api_base(mut self, api_base: Option<String>) -> Self {
        if let Some(base) = api_base
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
        {
            self.api_base = base;
        }
        self
    }

    pub fn with_timeout(mut self, timeout_s: Option<f64>) -> Self {
        if let Some(value) = timeout_s.filter(|value| value.is_finite()) {
            self.timeout_s = value.clamp(MIN_TIMEOUT_S, MAX_TIMEOUT_S);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_s)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
