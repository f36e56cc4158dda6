use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::OracleConfig;
use crate::parser::prompts::RESUME_MAX_TOKENS;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_RESUME_ENGINE: &str = "gpt-3.5-turbo-instruct";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub resume_engine: String,
    pub resume_max_tokens: u32,
    pub host: String,
    pub port: u16,
    pub upload_folder: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            openai_api_key: lookup("OPENAI_API_KEY").with_context(|| {
                "Required environment variable 'OPENAI_API_KEY' is not set".to_string()
            })?,
            openai_base_url: or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            resume_engine: or_default("RESUME_PARSER_ENGINE", DEFAULT_RESUME_ENGINE),
            resume_max_tokens: match lookup("RESUME_PARSER_MAX_TOKENS") {
                Some(raw) => raw
                    .parse::<u32>()
                    .context("RESUME_PARSER_MAX_TOKENS must be a non-negative integer")?,
                None => RESUME_MAX_TOKENS,
            },
            host: or_default("RESUME_PARSER_HOST", "127.0.0.1"),
            port: or_default("RESUME_PARSER_PORT", "8080")
                .parse::<u16>()
                .context("port must be an integer")?,
            upload_folder: PathBuf::from(or_default("UPLOAD_FOLDER", "./uploads")),
            rust_log: or_default("RUST_LOG", "info"),
        })
    }

    /// Credentials and endpoint handed to the completion client by value.
    pub fn oracle(&self) -> OracleConfig {
        OracleConfig {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied_when_only_api_key_set() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.resume_engine, "gpt-3.5-turbo-instruct");
        assert_eq!(config.resume_max_tokens, 1500);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_folder, PathBuf::from("./uploads"));
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_non_numeric_port_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("RESUME_PARSER_PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_are_respected() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1"),
            ("RESUME_PARSER_ENGINE", "davinci-002"),
            ("RESUME_PARSER_MAX_TOKENS", "900"),
            ("RESUME_PARSER_HOST", "0.0.0.0"),
            ("RESUME_PARSER_PORT", "3000"),
            ("UPLOAD_FOLDER", "/tmp/resumes"),
        ]))
        .unwrap();
        assert_eq!(config.resume_engine, "davinci-002");
        assert_eq!(config.resume_max_tokens, 900);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.upload_folder, PathBuf::from("/tmp/resumes"));

        let oracle = config.oracle();
        assert_eq!(oracle.api_key, "sk-test");
        assert_eq!(oracle.base_url, "http://localhost:9000/v1");
    }
}
