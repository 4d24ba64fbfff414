//! Client for the external social-profile API.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

use crate::config::EnrichmentConfig;
use crate::types::ExternalProfileId;
use crate::users::ExternalProfile;

/// Connect-level timeout for the profile API. The response deadline is
/// enforced separately by the enrichment race.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Enrichment payload returned by the profile service.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileData {
    /// URL of the user's current profile image.
    pub picture: Option<String>,
}

/// Per-user client for the external profile service.
///
/// Built from the application's consumer credentials plus the target
/// user's linked credentials; construction fails when either half is
/// missing, in which case the read proceeds without enrichment.
pub struct ProfileClient {
    http: reqwest::Client,
    show_url: Url,
    consumer_key: String,
    access_key: String,
    access_secret: String,
    profile_id: ExternalProfileId,
}

impl ProfileClient {
    /// Build a client for one user's linked external profile.
    pub fn for_user(config: &EnrichmentConfig, profile: &ExternalProfile) -> Result<Self> {
        let consumer_key = config
            .consumer_key
            .clone()
            .context("profile service consumer_key not configured")?;
        // The secret is required by the service even though only the key
        // travels in a header; refuse a half-configured setup.
        config
            .consumer_secret
            .as_ref()
            .context("profile service consumer_secret not configured")?;

        let base = Url::parse(&config.api_base).context("invalid profile API base URL")?;
        let show_url = base
            .join("v1/profiles/show")
            .context("invalid profile API base URL")?;

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            show_url,
            consumer_key,
            access_key: profile.access_key.clone(),
            access_secret: profile.access_secret.clone(),
            profile_id: profile.profile_id.clone(),
        })
    }

    /// Fetch the linked profile. Latency is unbounded and untrusted; the
    /// caller is expected to race this against a deadline.
    pub async fn fetch_profile(&self) -> Result<ProfileData> {
        let response = self
            .http
            .get(self.show_url.clone())
            .query(&[("profile_id", self.profile_id.as_str())])
            .header("X-Consumer-Key", &self.consumer_key)
            .bearer_auth(format!("{}:{}", self.access_key, self.access_secret))
            .send()
            .await
            .context("profile service request failed")?
            .error_for_status()
            .context("profile service returned an error status")?;

        let data: ProfileData = response
            .json()
            .await
            .context("could not parse profile service response")?;

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked_profile() -> ExternalProfile {
        ExternalProfile {
            profile_id: ExternalProfileId::new("12345"),
            access_key: "ak".to_string(),
            access_secret: "as".to_string(),
        }
    }

    #[test]
    fn test_construction_with_full_config() {
        let config = EnrichmentConfig {
            consumer_key: Some("ck".to_string()),
            consumer_secret: Some("cs".to_string()),
            ..Default::default()
        };

        assert!(ProfileClient::for_user(&config, &linked_profile()).is_ok());
    }

    #[test]
    fn test_construction_fails_without_consumer_credentials() {
        let config = EnrichmentConfig::default();
        assert!(ProfileClient::for_user(&config, &linked_profile()).is_err());

        let half = EnrichmentConfig {
            consumer_key: Some("ck".to_string()),
            ..Default::default()
        };
        assert!(ProfileClient::for_user(&half, &linked_profile()).is_err());
    }

    #[test]
    fn test_construction_fails_on_bad_base_url() {
        let config = EnrichmentConfig {
            api_base: "not a url".to_string(),
            consumer_key: Some("ck".to_string()),
            consumer_secret: Some("cs".to_string()),
            ..Default::default()
        };

        assert!(ProfileClient::for_user(&config, &linked_profile()).is_err());
    }

    #[test]
    fn test_profile_data_parsing() {
        let data: ProfileData =
            serde_json::from_str(r#"{"picture": "https://img.example/p.png"}"#).unwrap();
        assert_eq!(data.picture.as_deref(), Some("https://img.example/p.png"));

        let empty: ProfileData = serde_json::from_str("{}").unwrap();
        assert!(empty.picture.is_none());
    }
}
