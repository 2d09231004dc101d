use std::sync::Arc;
use std::time::Duration;

use mojang_identity::IdentityResolver;
use reqwest::Client;
use tiertag_model::TierProfile;
use tracing::{debug, info, warn};

use crate::normalize::{from_mctiers, from_south_tiers};
use crate::provider::ApiProvider;

/// Client for one configured ranking provider
///
/// A client is bound to a single [`ApiProvider`] at construction; switching
/// providers means building a new client (the invalidation controller does
/// exactly that). Every lookup issues one outbound GET and fails soft:
/// transport errors, non-200 statuses, and malformed bodies all map to
/// `None` with a logged warning.
pub struct TierClient {
    http: Client,
    provider: ApiProvider,
    base_url: String,
    identity: Arc<IdentityResolver>,
    log_requests: bool,
}

impl TierClient {
    /// Base URL for the MCTiers profile API
    pub const MCTIERS_BASE_URL: &'static str = "https://api.uku3lig.net/tiers/profile";
    /// Base URL for the SouthTiers profile API
    pub const SOUTH_TIERS_BASE_URL: &'static str = "http://too-butler.gl.at.ply.gg:1247/api/profile";
    /// Base URL for the PvPTiers profile API
    pub const PVPTIERS_BASE_URL: &'static str = "http://pvptiers.com/api/profile";

    /// Create a client for `provider` with the given request timeout
    pub fn new(
        provider: ApiProvider,
        identity: Arc<IdentityResolver>,
        timeout: Duration,
        log_requests: bool,
    ) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        let base_url = match provider {
            ApiProvider::Mctiers => Self::MCTIERS_BASE_URL,
            ApiProvider::SouthTiers => Self::SOUTH_TIERS_BASE_URL,
            ApiProvider::PvpTiers => Self::PVPTIERS_BASE_URL,
        };

        Self {
            http,
            provider,
            base_url: base_url.to_string(),
            identity,
            log_requests,
        }
    }

    /// Override the provider base URL (used by tests against a local server)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// The provider this client is bound to
    pub fn provider(&self) -> ApiProvider {
        self.provider
    }

    /// Fetch and normalize the tier profile for an identifier
    ///
    /// `has_uuid` says which form `identifier` is in; when the bound
    /// provider wants the other form, the identity resolver bridges the gap
    /// and a failed resolution yields `None`.
    pub async fn fetch(&self, identifier: &str, has_uuid: bool) -> Option<TierProfile> {
        match self.provider {
            ApiProvider::Mctiers => self.fetch_by_uuid(identifier, has_uuid).await,
            ApiProvider::SouthTiers | ApiProvider::PvpTiers => {
                self.fetch_by_name(identifier, has_uuid).await
            }
        }
    }

    async fn fetch_by_uuid(&self, identifier: &str, has_uuid: bool) -> Option<TierProfile> {
        let uuid = if has_uuid {
            identifier.to_string()
        } else {
            match self.identity.uuid_for_name(identifier).await {
                Some(uuid) => uuid,
                None => {
                    debug!(
                        provider = %self.provider,
                        username = identifier,
                        "Could not resolve username to UUID"
                    );
                    return None;
                }
            }
        };

        let url = format!("{}/{}", self.base_url, uuid.replace('-', ""));
        let body = self.get_body(&url).await?;

        match from_mctiers(&body) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(provider = %self.provider, error = %e, "Failed to normalize response");
                None
            }
        }
    }

    async fn fetch_by_name(&self, identifier: &str, has_uuid: bool) -> Option<TierProfile> {
        let username = if has_uuid {
            match self.identity.name_for_uuid(identifier).await {
                Some(name) => name,
                None => {
                    debug!(
                        provider = %self.provider,
                        uuid = identifier,
                        "Could not resolve UUID to username"
                    );
                    return None;
                }
            }
        } else {
            identifier.to_string()
        };

        let url = format!("{}/{}", self.base_url, urlencoding::encode(&username));
        let body = self.get_body(&url).await?;

        match from_south_tiers(&body) {
            Ok(mut profile) => {
                // The wire format carries no UUID; keep the caller's
                if has_uuid {
                    profile.uuid = Some(identifier.to_string());
                }
                Some(profile)
            }
            Err(e) => {
                warn!(provider = %self.provider, error = %e, "Failed to normalize response");
                None
            }
        }
    }

    /// Issue the single outbound GET; `None` for non-200 or transport failure
    async fn get_body(&self, url: &str) -> Option<String> {
        if self.log_requests {
            info!(provider = %self.provider, url, "Fetching tier profile");
        }

        match self.http.get(url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!(provider = %self.provider, error = %e, "Failed to read response body");
                    None
                }
            },
            Ok(response) => {
                debug!(
                    provider = %self.provider,
                    status = %response.status(),
                    "Provider returned non-success status"
                );
                None
            }
            Err(e) => {
                warn!(provider = %self.provider, error = %e, "Provider request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "11111111-1111-1111-1111-111111111111";

    fn identity_for(server: &mockito::Server) -> Arc<IdentityResolver> {
        Arc::new(IdentityResolver::with_service_url(&server.url()))
    }

    fn client_for(
        provider: ApiProvider,
        server: &mockito::Server,
        identity: Arc<IdentityResolver>,
    ) -> TierClient {
        TierClient::new(provider, identity, Duration::from_secs(5), false).with_base_url(&server.url())
    }

    #[tokio::test]
    async fn test_mctiers_fetch_by_uuid() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/11111111111111111111111111111111")
            .with_status(200)
            .with_body(
                r#"{"uuid":"11111111-1111-1111-1111-111111111111","name":"Steve",
                    "rankings":{"vanilla":{"tier":3,"pos":12,"peak_tier":2,"peak_pos":5,"attained":1000,"retired":false}}}"#,
            )
            .create_async()
            .await;

        let identity = identity_for(&server);
        let client = client_for(ApiProvider::Mctiers, &server, identity);

        let profile = client.fetch(UUID, true).await.unwrap();
        assert_eq!(profile.username, "Steve");
        assert_eq!(profile.tier_for_gamemode("vanilla"), "HT2");
        assert_eq!(profile.best_tier(), "HT2");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_mctiers_fetch_by_name_resolves_uuid_first() {
        let mut identity_server = mockito::Server::new_async().await;
        identity_server
            .mock("GET", "/users/by-name/Steve")
            .with_status(200)
            .with_body(r#"{"id":"11111111111111111111111111111111","name":"Steve"}"#)
            .create_async()
            .await;

        let mut provider_server = mockito::Server::new_async().await;
        let mock = provider_server
            .mock("GET", "/11111111111111111111111111111111")
            .with_status(200)
            .with_body(r#"{"uuid":"11111111-1111-1111-1111-111111111111","name":"Steve"}"#)
            .create_async()
            .await;

        let identity = identity_for(&identity_server);
        let client = client_for(ApiProvider::Mctiers, &provider_server, identity);

        let profile = client.fetch("Steve", false).await.unwrap();
        assert_eq!(profile.uuid.as_deref(), Some(UUID));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_mctiers_fetch_fails_soft_when_resolution_fails() {
        let mut identity_server = mockito::Server::new_async().await;
        identity_server
            .mock("GET", "/users/by-name/Nobody")
            .with_status(404)
            .create_async()
            .await;

        // Provider server would panic the test if hit; no mock registered
        let mut provider_server = mockito::Server::new_async().await;
        let never = provider_server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let identity = identity_for(&identity_server);
        let client = client_for(ApiProvider::Mctiers, &provider_server, identity);

        assert!(client.fetch("Nobody", false).await.is_none());
        never.assert_async().await;
    }

    #[tokio::test]
    async fn test_south_tiers_fetch_by_uuid_attaches_identifier() {
        let mut identity_server = mockito::Server::new_async().await;
        identity_server
            .mock("GET", "/session/profile/11111111111111111111111111111111")
            .with_status(200)
            .with_body(r#"{"id":"11111111111111111111111111111111","name":"Steve"}"#)
            .create_async()
            .await;

        let mut provider_server = mockito::Server::new_async().await;
        provider_server
            .mock("GET", "/Steve")
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"jogador":"Steve","ranking":"Low Tier 1"}}"#)
            .create_async()
            .await;

        let identity = identity_for(&identity_server);
        let client = client_for(ApiProvider::SouthTiers, &provider_server, identity);

        let profile = client.fetch(UUID, true).await.unwrap();
        assert_eq!(profile.uuid.as_deref(), Some(UUID));
        assert_eq!(profile.best_tier(), "LT1");
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/11111111111111111111111111111111")
            .with_status(500)
            .create_async()
            .await;

        let identity = identity_for(&server);
        let client = client_for(ApiProvider::Mctiers, &server, identity);

        assert!(client.fetch(UUID, true).await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/11111111111111111111111111111111")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let identity = identity_for(&server);
        let client = client_for(ApiProvider::Mctiers, &server, identity);

        assert!(client.fetch(UUID, true).await.is_none());
    }
}
