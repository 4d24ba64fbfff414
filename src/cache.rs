//! Best-effort invalidation of cached profile-image artifacts.
//!
//! When a user is deleted, their profile image may still sit in the image
//! cache service under a well-known key. Cleanup is a secondary side
//! effect: a failure here is logged and swallowed, never surfaced, because
//! the primary deletion has already succeeded and is not rolled back.

use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::ImageCacheConfig;
use crate::types::UserId;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the image cache service's invalidation endpoint.
pub struct ImageCacheClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    api_secret: String,
    env_name: String,
}

impl ImageCacheClient {
    pub fn new(config: &ImageCacheConfig, env_name: &str) -> Result<Self> {
        let endpoint =
            Url::parse(&config.endpoint).context("invalid image cache endpoint URL")?;
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            env_name: env_name.to_string(),
        })
    }

    /// Cache key under which a user's profile image is stored.
    pub fn cache_key(&self, user_id: &UserId) -> String {
        format!("{}/profile_image/{}", self.env_name, user_id)
    }

    /// Ask the cache service to drop the user's profile image artifact.
    ///
    /// Callers treat any error as best-effort failure: log and continue.
    pub async fn invalidate(&self, user_id: &UserId) -> Result<()> {
        let public_id = self.cache_key(user_id);
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&public_id, &timestamp);

        self.http
            .post(self.endpoint.clone())
            .form(&[
                ("public_id", public_id.as_str()),
                ("api_key", self.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .context("image cache request failed")?
            .error_for_status()
            .context("image cache returned an error status")?;

        Ok(())
    }

    fn sign(&self, public_id: &str, timestamp: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "public_id={}&timestamp={}{}",
            public_id, timestamp, self.api_secret
        ));
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(env_name: &str) -> ImageCacheClient {
        let config = ImageCacheConfig {
            endpoint: "https://cache.example.com/invalidate".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        };
        ImageCacheClient::new(&config, env_name).unwrap()
    }

    #[test]
    fn test_cache_key_namespaced_by_env() {
        let client = client("staging");
        assert_eq!(
            client.cache_key(&UserId::new("jane")),
            "staging/profile_image/jane"
        );
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let config = ImageCacheConfig {
            endpoint: "not a url".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        };
        assert!(ImageCacheClient::new(&config, "local").is_err());
    }

    #[test]
    fn test_signature_is_hex_and_deterministic() {
        let client = client("local");
        let a = client.sign("local/profile_image/jane", "1700000000");
        let b = client.sign("local/profile_image/jane", "1700000000");
        let c = client.sign("local/profile_image/john", "1700000000");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
