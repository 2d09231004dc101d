use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use tracing::{debug, warn};

use crate::types::{NameLookupResponse, SessionProfileResponse};

const DEFAULT_SERVICE_URL: &str = "https://api.mojang.com";
const CACHE_TTL_SECS: u64 = 300; // 5 minutes
const LOOKUP_TIMEOUT_SECS: u64 = 5;

/// Resolves account identities (display names ↔ UUIDs) with short-lived caching
///
/// Every outbound call carries a fixed 5 second timeout independent of the
/// ranking providers' configured timeout. All failures resolve to `None`;
/// callers treat a failed resolution the same as an unknown player.
pub struct IdentityResolver {
    client: Client,
    service_url: String,
    uuid_cache: Cache<String, String>,
    name_cache: Cache<String, String>,
}

impl IdentityResolver {
    /// Create a new resolver against the default identity service
    pub fn new() -> Self {
        Self::with_service_url(DEFAULT_SERVICE_URL)
    }

    /// Create a new resolver with a custom identity service URL
    pub fn with_service_url(service_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        let uuid_cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .build();

        let name_cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .build();

        Self {
            client,
            service_url: service_url.trim_end_matches('/').to_string(),
            uuid_cache,
            name_cache,
        }
    }

    /// Resolve a display name to a dashed account UUID
    pub async fn uuid_for_name(&self, username: &str) -> Option<String> {
        let key = username.to_lowercase();
        if let Some(cached) = self.uuid_cache.get(&key).await {
            return Some(cached);
        }

        let url = format!(
            "{}/users/by-name/{}",
            self.service_url,
            urlencoding::encode(username)
        );

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<NameLookupResponse>().await {
                    Ok(data) => {
                        let uuid = dash_uuid(&data.id)?;
                        self.uuid_cache.insert(key, uuid.clone()).await;
                        self.name_cache
                            .insert(uuid.to_lowercase(), username.to_string())
                            .await;
                        Some(uuid)
                    }
                    Err(e) => {
                        warn!(username, error = %e, "Failed to parse name lookup response");
                        None
                    }
                }
            }
            Ok(response) => {
                debug!(username, status = %response.status(), "Name lookup rejected");
                None
            }
            Err(e) => {
                warn!(username, error = %e, "Name lookup request failed");
                None
            }
        }
    }

    /// Resolve an account UUID (dashed or undashed) to a display name
    pub async fn name_for_uuid(&self, uuid: &str) -> Option<String> {
        let undashed = uuid.replace('-', "");
        let key = dash_uuid(&undashed)?.to_lowercase();
        if let Some(cached) = self.name_cache.get(&key).await {
            return Some(cached);
        }

        let url = format!("{}/session/profile/{}", self.service_url, undashed);

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<SessionProfileResponse>().await {
                    Ok(data) => {
                        self.name_cache.insert(key.clone(), data.name.clone()).await;
                        self.uuid_cache
                            .insert(data.name.to_lowercase(), key)
                            .await;
                        Some(data.name)
                    }
                    Err(e) => {
                        warn!(uuid, error = %e, "Failed to parse session profile response");
                        None
                    }
                }
            }
            Ok(response) => {
                debug!(uuid, status = %response.status(), "Session profile lookup rejected");
                None
            }
            Err(e) => {
                warn!(uuid, error = %e, "Session profile request failed");
                None
            }
        }
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a UUID to the dashed 8-4-4-4-12 form
///
/// Accepts either an undashed 32-hex string or an already-dashed 36-char
/// string; anything else is rejected.
fn dash_uuid(raw: &str) -> Option<String> {
    if raw.len() == 36 && raw.bytes().filter(|b| *b == b'-').count() == 4 {
        return Some(raw.to_string());
    }
    if raw.len() != 32 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!(
        "{}-{}-{}-{}-{}",
        &raw[0..8],
        &raw[8..12],
        &raw[12..16],
        &raw[16..20],
        &raw[20..32]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_uuid_inserts_hyphens() {
        let dashed = dash_uuid("11111111111111111111111111111111").unwrap();
        assert_eq!(dashed, "11111111-1111-1111-1111-111111111111");
    }

    #[test]
    fn test_dash_uuid_accepts_dashed_input() {
        let input = "11111111-1111-1111-1111-111111111111";
        assert_eq!(dash_uuid(input).unwrap(), input);
    }

    #[test]
    fn test_dash_uuid_rejects_garbage() {
        assert!(dash_uuid("steve").is_none());
        assert!(dash_uuid("").is_none());
        assert!(dash_uuid("zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz").is_none());
    }

    #[tokio::test]
    async fn test_uuid_for_name_resolves_and_caches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/by-name/Steve")
            .with_status(200)
            .with_body(r#"{"id":"11111111111111111111111111111111","name":"Steve"}"#)
            .expect(1)
            .create_async()
            .await;

        let resolver = IdentityResolver::with_service_url(&server.url());
        let uuid = resolver.uuid_for_name("Steve").await.unwrap();
        assert_eq!(uuid, "11111111-1111-1111-1111-111111111111");

        // Second lookup is served from the cache (mock expects one hit)
        let again = resolver.uuid_for_name("Steve").await.unwrap();
        assert_eq!(again, uuid);

        // The reverse direction was primed by the forward lookup
        let name = resolver.name_for_uuid(&uuid).await.unwrap();
        assert_eq!(name, "Steve");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_name_for_uuid_strips_hyphens_in_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/session/profile/11111111111111111111111111111111")
            .with_status(200)
            .with_body(r#"{"id":"11111111111111111111111111111111","name":"Steve"}"#)
            .create_async()
            .await;

        let resolver = IdentityResolver::with_service_url(&server.url());
        let name = resolver
            .name_for_uuid("11111111-1111-1111-1111-111111111111")
            .await
            .unwrap();
        assert_eq!(name, "Steve");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_lookup_failure_maps_to_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/by-name/Nobody")
            .with_status(404)
            .create_async()
            .await;

        let resolver = IdentityResolver::with_service_url(&server.url());
        assert!(resolver.uuid_for_name("Nobody").await.is_none());
    }
}
