use std::str::FromStr;

use anyhow::{bail, Context, Result};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which `ResumeAnalyzer` the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyzerBackend {
    #[default]
    Llm,
    Keyword,
}

impl FromStr for AnalyzerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(AnalyzerBackend::Llm),
            "keyword" => Ok(AnalyzerBackend::Keyword),
            other => bail!("ANALYZER_BACKEND must be 'llm' or 'keyword', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if the selected backend's requirements are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub analyzer_backend: AnalyzerBackend,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let analyzer_backend = match non_blank("ANALYZER_BACKEND") {
            Some(raw) => raw.parse()?,
            None => AnalyzerBackend::default(),
        };
        let anthropic_api_key = non_blank("ANTHROPIC_API_KEY");
        if analyzer_backend == AnalyzerBackend::Llm && anthropic_api_key.is_none() {
            bail!("Required environment variable 'ANTHROPIC_API_KEY' is not set (ANALYZER_BACKEND=llm)");
        }

        Ok(Config {
            anthropic_api_key,
            analyzer_backend,
            port: match non_blank("PORT") {
                Some(raw) => raw
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => DEFAULT_PORT,
            },
            max_upload_bytes: match non_blank("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            rust_log: non_blank("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Offline configuration for tests and local hosts.
    pub fn keyword_only() -> Self {
        Config {
            anthropic_api_key: None,
            analyzer_backend: AnalyzerBackend::Keyword,
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            rust_log: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("ANTHROPIC_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.analyzer_backend, AnalyzerBackend::Llm);
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_llm_backend_requires_api_key() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
        assert!(load(&[("ANTHROPIC_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn test_keyword_backend_runs_without_key() {
        let config = load(&[("ANALYZER_BACKEND", "Keyword"), ("PORT", "9000")]).unwrap();
        assert_eq!(config.analyzer_backend, AnalyzerBackend::Keyword);
        assert_eq!(config.anthropic_api_key, None);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(load(&[("ANALYZER_BACKEND", "gpt")]).is_err());
        assert!(load(&[("ANALYZER_BACKEND", "keyword"), ("PORT", "eighty")]).is_err());
        assert!(load(&[("ANALYZER_BACKEND", "keyword"), ("MAX_UPLOAD_BYTES", "-1")]).is_err());
    }
}
