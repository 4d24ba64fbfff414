//! Application configuration.
//!
//! Configuration is loaded from a JSON file (`studio.json` by default, or
//! the path named by `STUDIO_CONFIG`). String values support `${VAR}`
//! environment expansion so secrets can stay out of the file itself.

use serde::Deserialize;
use std::time::Duration;
use std::{env, fs, path::PathBuf};
use url::Url;

/// Top-level configuration for the user API service.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Deployment environment name, used to namespace cache artifacts
    /// (e.g. "local", "staging", "production").
    #[serde(default = "default_env_name")]
    pub env_name: String,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Image cache invalidation endpoint. Optional: when absent, delete
    /// skips the cache cleanup step entirely.
    #[serde(default)]
    pub image_cache: Option<ImageCacheConfig>,
}

/// Settings for the external profile-enrichment call.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Base URL of the external profile service API.
    #[serde(default = "default_profile_api_base")]
    pub api_base: String,

    /// Application-level consumer credentials for the profile service.
    /// When either is missing the enrichment client cannot be constructed
    /// and reads are served without augmentation.
    #[serde(default)]
    pub consumer_key: Option<String>,
    #[serde(default)]
    pub consumer_secret: Option<String>,

    /// Deadline for the enrichment race, in milliseconds. The read response
    /// is never delayed past this, whatever the profile service does.
    #[serde(default = "default_enrichment_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_base: default_profile_api_base(),
            consumer_key: None,
            consumer_secret: None,
            timeout_ms: default_enrichment_timeout_ms(),
        }
    }
}

impl EnrichmentConfig {
    /// The race deadline as a `Duration`.
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Settings for the profile-image cache service.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageCacheConfig {
    /// Invalidation endpoint of the cache service.
    pub endpoint: String,
    /// API key sent with invalidation requests.
    pub api_key: String,
    /// Secret used to sign invalidation requests.
    pub api_secret: String,
}

fn default_env_name() -> String {
    "local".to_string()
}

fn default_profile_api_base() -> String {
    "https://api.profileservice.example".to_string()
}

fn default_enrichment_timeout_ms() -> u64 {
    4000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env_name: default_env_name(),
            enrichment: EnrichmentConfig::default(),
            image_cache: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, expanding `${VAR}` references.
    pub fn from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        let config = expand_config(config);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the resolved default location, falling back
    /// to defaults when no file exists.
    pub fn load() -> anyhow::Result<Self> {
        match resolve_config_path() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        Url::parse(&self.enrichment.api_base)
            .map_err(|e| anyhow::anyhow!("Invalid enrichment api_base: {}", e))?;
        if let Some(cache) = &self.image_cache {
            Url::parse(&cache.endpoint)
                .map_err(|e| anyhow::anyhow!("Invalid image_cache endpoint: {}", e))?;
        }
        Ok(())
    }
}

/// Resolve the config file path: `STUDIO_CONFIG`, then `./studio.json`.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(p) = env::var("STUDIO_CONFIG") {
        return Some(PathBuf::from(p));
    }

    let candidate = PathBuf::from("studio.json");
    if candidate.exists() {
        return Some(candidate);
    }

    None
}

fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            while let Some(c) = chars.next() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            if let Ok(val) = env::var(&name) {
                out.push_str(&val);
            } else {
                out.push_str("${");
                out.push_str(&name);
                out.push('}');
            }
        } else {
            out.push(ch);
        }
    }

    out
}

fn expand_config(config: AppConfig) -> AppConfig {
    let mut config = config;

    config.env_name = expand_env_vars(&config.env_name);
    config.enrichment.api_base = expand_env_vars(&config.enrichment.api_base);
    if let Some(key) = config.enrichment.consumer_key.as_mut() {
        *key = expand_env_vars(key);
    }
    if let Some(secret) = config.enrichment.consumer_secret.as_mut() {
        *secret = expand_env_vars(secret);
    }
    if let Some(cache) = config.image_cache.as_mut() {
        cache.endpoint = expand_env_vars(&cache.endpoint);
        cache.api_key = expand_env_vars(&cache.api_key);
        cache.api_secret = expand_env_vars(&cache.api_secret);
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.env_name, "local");
        assert_eq!(config.enrichment.timeout_ms, 4000);
        assert!(config.enrichment.consumer_key.is_none());
        assert!(config.image_cache.is_none());
    }

    #[test]
    fn test_deadline_duration() {
        let enrichment = EnrichmentConfig {
            timeout_ms: 250,
            ..Default::default()
        };
        assert_eq!(enrichment.deadline(), Duration::from_millis(250));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "env_name": "staging",
                "enrichment": {{
                    "api_base": "https://profiles.example.com",
                    "consumer_key": "ck",
                    "consumer_secret": "cs",
                    "timeout_ms": 1500
                }},
                "image_cache": {{
                    "endpoint": "https://cache.example.com/invalidate",
                    "api_key": "key",
                    "api_secret": "secret"
                }}
            }}"#
        )
        .unwrap();

        let config = AppConfig::from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.env_name, "staging");
        assert_eq!(config.enrichment.timeout_ms, 1500);
        assert_eq!(config.enrichment.consumer_key.as_deref(), Some("ck"));
        assert!(config.image_cache.is_some());
    }

    #[test]
    fn test_from_file_rejects_bad_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "enrichment": {{ "api_base": "not a url" }} }}"#
        )
        .unwrap();

        assert!(AppConfig::from_file(&file.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test-local variable, no concurrent reader depends on it.
        unsafe { env::set_var("STUDIO_TEST_SECRET", "s3cr3t") };
        assert_eq!(expand_env_vars("${STUDIO_TEST_SECRET}"), "s3cr3t");
        assert_eq!(
            expand_env_vars("prefix-${STUDIO_TEST_SECRET}-suffix"),
            "prefix-s3cr3t-suffix"
        );
        // Unknown variables are left as-is.
        assert_eq!(
            expand_env_vars("${STUDIO_TEST_UNSET_VAR}"),
            "${STUDIO_TEST_UNSET_VAR}"
        );
    }
}
