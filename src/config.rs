use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_RESULT_EXPIRATION_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Spreadsheet export to load, or a directory to look for one in
    pub data_path: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Verbose logging
    pub debug: bool,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Upper bound for the caller-supplied annotation thread count
    pub max_threads: usize,
    /// Annotation results older than this are swept
    pub result_expiration_hours: i64,
    /// Interval of the background expiry sweep
    pub sweep_interval_secs: u64,
    /// Simulated per-row latency in dry-run mode
    pub dry_run_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai" or "ollama"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model used when an annotation request does not name one
    pub default_model: String,
    /// Default API key, used when the request carries none
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("."),
            bind_addr: "127.0.0.1:5000".to_string(),
            debug: false,
            llm: LlmConfig::default(),
            max_threads: 200,
            result_expiration_hours: DEFAULT_RESULT_EXPIRATION_HOURS,
            sweep_interval_secs: 3600,
            dry_run_delay_ms: 100,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: "https://api.openai.com".to_string(),
            default_model: "gpt-5-nano".to_string(),
            api_key: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("ANNOTATOR_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(5000);
        config.bind_addr = format!("{host}:{port}");

        if let Ok(val) = std::env::var("ANNOTATOR_DEBUG") {
            config.debug = val.eq_ignore_ascii_case("true");
        }
        if let Ok(val) = std::env::var("ANNOTATOR_MAX_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.max_threads = v.max(1);
            }
        }
        if let Ok(val) = std::env::var("ANNOTATOR_RESULT_EXPIRATION_HOURS") {
            if let Ok(v) = val.parse() {
                config.result_expiration_hours = v;
            }
        }
        if let Ok(val) = std::env::var("ANNOTATOR_SWEEP_INTERVAL_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.sweep_interval_secs = v.max(1);
            }
        }
        if let Ok(val) = std::env::var("ANNOTATOR_DRY_RUN_DELAY_MS") {
            if let Ok(v) = val.parse() {
                config.dry_run_delay_ms = v;
            }
        }

        // LLM config
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("LLM_DEFAULT_MODEL") {
            config.llm.default_model = model;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                config.llm.api_key = Some(key);
            }
        }

        config
    }

    /// Retention window for annotation results. Out-of-range hour counts
    /// fall back to the default 24 hours.
    pub fn result_retention(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.result_expiration_hours)
            .filter(|d| *d > chrono::Duration::zero())
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_RESULT_EXPIRATION_HOURS))
    }

    pub fn dry_run_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.dry_run_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_retention_falls_back_to_default() {
        for hours in [99_999_999_999_999, i64::MAX, 0, -5] {
            let config = Config {
                result_expiration_hours: hours,
                ..Config::default()
            };
            assert_eq!(config.result_retention(), chrono::Duration::hours(24), "{hours}");
        }
        let config = Config {
            result_expiration_hours: 2,
            ..Config::default()
        };
        assert_eq!(config.result_retention(), chrono::Duration::hours(2));
    }

    #[test]
    fn test_defaults_match_original_service() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "127.0.0.1:5000");
        assert_eq!(config.max_threads, 200);
        assert_eq!(config.result_retention(), chrono::Duration::hours(24));
        assert_eq!(config.llm.provider, "openai");
        assert!(config.llm.api_key.is_none());
    }
}
