use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::documents::stager::{DEFAULT_CHUNK_SIZE, DEFAULT_STAGING_THRESHOLD};
use crate::types::{AppError, AppResult};

const MIB: u64 = 1024 * 1024;

pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub upload: UploadConfig,
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone, Deserialize)]
pub struct LLMConfig {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
}

// Keeps the API key out of logs.
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("provider", &self.provider)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_upload_bytes: usize,
    pub staging_threshold_bytes: u64,
    pub staging_chunk_bytes: usize,
    pub staging_dir: Option<PathBuf>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: (1024 * MIB) as usize,
            staging_threshold_bytes: DEFAULT_STAGING_THRESHOLD,
            staging_chunk_bytes: DEFAULT_CHUNK_SIZE,
            staging_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub filter: String,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = var("LLM_PROVIDER").unwrap_or_else(|| "together".to_string());
        let api_key = var("LLM_API_KEY")
            .or_else(|| var("TOGETHER_API_KEY"))
            .unwrap_or_default();

        Ok(Self {
            server: ServerConfig {
                port: parse_or("PORT", var("PORT"), 8501)?,
                host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                cors_allowed_origins: var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            llm: LLMConfig {
                provider,
                api_key,
                model: var("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                api_base: var("LLM_API_BASE"),
                timeout_secs: var("LLM_TIMEOUT_SECS")
                    .map(|v| parse("LLM_TIMEOUT_SECS", &v))
                    .transpose()?,
            },
            upload: UploadConfig {
                max_upload_bytes: to_usize(
                    "MAX_UPLOAD_MB",
                    megabytes("MAX_UPLOAD_MB", var("MAX_UPLOAD_MB"), 1024)?,
                )?,
                staging_threshold_bytes: megabytes(
                    "STAGING_THRESHOLD_MB",
                    var("STAGING_THRESHOLD_MB"),
                    DEFAULT_STAGING_THRESHOLD / MIB,
                )?,
                staging_chunk_bytes: to_usize(
                    "STAGING_CHUNK_MB",
                    megabytes(
                        "STAGING_CHUNK_MB",
                        var("STAGING_CHUNK_MB"),
                        DEFAULT_CHUNK_SIZE as u64 / MIB,
                    )?,
                )?,
                staging_dir: var("STAGING_DIR").map(PathBuf::from),
            },
            logging: LogConfig {
                filter: var("LOG_FILTER")
                    .unwrap_or_else(|| "file_chat=debug,tower_http=debug".to_string()),
                log_dir: var("LOG_DIR").map(PathBuf::from),
            },
        })
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{} has invalid value {:?}: {}", key, value, e)))
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => parse(key, &v),
        None => Ok(default),
    }
}

/// A size given in MB, as bytes.
fn megabytes(key: &str, value: Option<String>, default_mb: u64) -> AppResult<u64> {
    parse_or(key, value, default_mb)?
        .checked_mul(MIB)
        .ok_or_else(|| AppError::Config(format!("{} is too large", key)))
}

fn to_usize(key: &str, bytes: u64) -> AppResult<usize> {
    usize::try_from(bytes)
        .map_err(|_| AppError::Config(format!("{} does not fit in memory on this platform", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppResult<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.server.cors_allowed_origins, vec!["*"]);
        assert_eq!(config.llm.provider, "together");
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert!(config.llm.api_key.is_empty());
        assert!(config.llm.timeout_secs.is_none());
        assert_eq!(config.upload.staging_threshold_bytes, 200 * MIB);
        assert_eq!(config.upload.staging_chunk_bytes, 50 * MIB as usize);
        assert_eq!(config.upload.max_upload_bytes, 1024 * MIB as usize);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("ALLOWED_ORIGINS", "http://a.test, http://b.test"),
            ("LLM_PROVIDER", "groq"),
            ("TOGETHER_API_KEY", "tg-key"),
            ("LLM_TIMEOUT_SECS", "30"),
            ("STAGING_THRESHOLD_MB", "10"),
            ("STAGING_CHUNK_MB", "2"),
            ("STAGING_DIR", "/var/tmp/file-chat"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["http://a.test", "http://b.test"]
        );
        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.api_key, "tg-key");
        assert_eq!(config.llm.timeout_secs, Some(30));
        assert_eq!(config.upload.staging_threshold_bytes, 10 * MIB);
        assert_eq!(config.upload.staging_chunk_bytes, 2 * MIB as usize);
        assert_eq!(
            config.upload.staging_dir,
            Some(PathBuf::from("/var/tmp/file-chat"))
        );
    }

    #[test]
    fn test_explicit_key_wins_over_together_key() {
        let config = config_from(&[("LLM_API_KEY", "primary"), ("TOGETHER_API_KEY", "fallback")])
            .unwrap();
        assert_eq!(config.llm.api_key, "primary");
    }

    #[test]
    fn test_invalid_number_is_a_config_error() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_oversized_megabytes_are_a_config_error() {
        for key in ["MAX_UPLOAD_MB", "STAGING_THRESHOLD_MB", "STAGING_CHUNK_MB"] {
            let err = config_from(&[(key, "18446744073709551615")]).unwrap_err();
            assert!(matches!(err, AppError::Config(_)));
            assert!(err.to_string().contains(key));
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = config_from(&[("LLM_API_KEY", "sk-secret")]).unwrap();
        let rendered = format!("{:?}", config.llm);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
