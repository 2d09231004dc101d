use std::sync::Arc;
use std::time::Duration;

use mojang_identity::IdentityResolver;
use tiertag_db::TierCache;
use tiertag_model::{TierProfile, UNRANKED};
use tiertag_providers::{ApiProvider, TierClient};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::tracker::TrackedPlayers;

/// Retrieval orchestrator and invalidation controller
///
/// The one entry point collaborators call: `resolve_profile` on join and on
/// lookup commands, `on_provider_changed` after a config reload. It owns the
/// provider client, the persistent cache, the identity resolver, and the
/// tracked-player registry.
///
/// Concurrent `resolve_profile` calls for the same identifier are not
/// coalesced; both may fetch and the later upsert wins, which is acceptable
/// for eventually-consistent profile data.
pub struct TierService {
    config: Config,
    identity: Arc<IdentityResolver>,
    client: RwLock<TierClient>,
    cache: Option<TierCache>,
    tracked: TrackedPlayers,
    base_override: Option<String>,
}

impl TierService {
    /// Build the service from configuration
    ///
    /// A cache store that cannot be opened disables caching (every lookup
    /// fetches) instead of failing construction.
    pub async fn new(config: Config) -> Self {
        let identity = Arc::new(IdentityResolver::new());

        let cache = match TierCache::connect(
            &config.database_url,
            config.database_pool_size,
            config.cache_duration_minutes,
        )
        .await
        {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(error = %e, "Tier cache unavailable, caching disabled");
                None
            }
        };

        let client = RwLock::new(build_client(&config, config.provider, &identity, None));

        Self {
            config,
            identity,
            client,
            cache,
            tracked: TrackedPlayers::new(),
            base_override: None,
        }
    }

    /// Point identity resolution at a custom service URL
    pub fn with_identity_service(mut self, service_url: &str) -> Self {
        self.identity = Arc::new(IdentityResolver::with_service_url(service_url));
        let provider = self.client.get_mut().provider();
        *self.client.get_mut() = build_client(
            &self.config,
            provider,
            &self.identity,
            self.base_override.as_deref(),
        );
        self
    }

    /// Override the provider base URL, including for clients built after a
    /// provider switch (used by tests and API mirrors)
    pub fn with_provider_base_url(mut self, base_url: &str) -> Self {
        self.base_override = Some(base_url.trim_end_matches('/').to_string());
        let provider = self.client.get_mut().provider();
        *self.client.get_mut() = build_client(
            &self.config,
            provider,
            &self.identity,
            self.base_override.as_deref(),
        );
        self
    }

    /// The provider currently being queried
    pub async fn provider(&self) -> ApiProvider {
        self.client.read().await.provider()
    }

    /// The tracked-player registry
    pub fn tracked(&self) -> &TrackedPlayers {
        &self.tracked
    }

    /// Resolve a profile: cached if fresh, fetched otherwise
    ///
    /// `identifier` is an account UUID when `has_uuid` is set, a display
    /// name otherwise. Returns `None` when neither the cache nor the active
    /// provider produced a profile; this function never errors.
    pub async fn resolve_profile(&self, identifier: &str, has_uuid: bool) -> Option<TierProfile> {
        if has_uuid {
            if let Some(cache) = &self.cache {
                if let Some(profile) = cache.get_fresh(identifier).await {
                    if self.config.debug_enabled {
                        debug!(uuid = identifier, "Loaded tier profile from cache");
                    }
                    return Some(profile);
                }
            }
        }

        let profile = {
            let client = self.client.read().await;
            client.fetch(identifier, has_uuid).await?
        };

        if let Some(cache) = &self.cache {
            // Only a known UUID can key a cache row
            let uuid = if has_uuid {
                Some(identifier.to_string())
            } else {
                profile.uuid.clone()
            };
            if let Some(uuid) = uuid {
                cache.upsert(&uuid, &profile.username, &profile).await;
            }
        }

        Some(profile)
    }

    /// React to a provider configuration change
    ///
    /// On an actual change: swap the live client, clear the cache, then
    /// refetch every tracked player concurrently, logging each outcome.
    /// When `old == new` nothing happens.
    pub async fn on_provider_changed(&self, old: ApiProvider, new: ApiProvider) {
        if old == new {
            debug!(provider = %new, "API provider unchanged, keeping cached tiers");
            return;
        }

        info!(%old, %new, "API provider changed, clearing cached tiers");

        {
            let mut client = self.client.write().await;
            *client = build_client(&self.config, new, &self.identity, self.base_override.as_deref());
        }

        if let Some(cache) = &self.cache {
            cache.clear_all().await;
        }

        self.refetch_tracked().await;
    }

    async fn refetch_tracked(&self) {
        let players = self.tracked.snapshot().await;
        if players.is_empty() {
            return;
        }

        info!(players = players.len(), "Refetching tier profiles for tracked players");

        let refetches = players.into_iter().map(|(uuid, username)| async move {
            match self.resolve_profile(&uuid, true).await {
                Some(profile) => {
                    info!(username, tier = profile.best_tier(), "Refetched tier profile");
                }
                None => {
                    warn!(username, "No tier profile found after provider change");
                }
            }
        });
        futures::future::join_all(refetches).await;
    }

    /// Tier label to display for a profile: the configured default
    /// gamemode's tier when ranked there, otherwise the best tier
    pub fn display_tier(&self, profile: &TierProfile) -> &'static str {
        let tier = profile.tier_for_gamemode(&self.config.default_gamemode);
        if tier == UNRANKED {
            profile.best_tier()
        } else {
            tier
        }
    }

    /// Empty the cache store; returns the number of rows removed
    pub async fn clear_cache(&self) -> u64 {
        match &self.cache {
            Some(cache) => cache.clear_all().await,
            None => 0,
        }
    }

    /// Remove expired cache rows; returns the number removed
    pub async fn sweep_expired(&self) -> u64 {
        match &self.cache {
            Some(cache) => cache.sweep_expired().await,
            None => 0,
        }
    }

    /// Periodically sweep expired cache rows until the task is aborted
    pub fn spawn_cache_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // the first tick completes immediately
            loop {
                interval.tick().await;
                service.sweep_expired().await;
            }
        })
    }

    /// Close the cache store, waiting for in-flight writes
    pub async fn shutdown(&self) {
        if let Some(cache) = &self.cache {
            cache.close().await;
        }
    }
}

fn build_client(
    config: &Config,
    provider: ApiProvider,
    identity: &Arc<IdentityResolver>,
    base_override: Option<&str>,
) -> TierClient {
    let client = TierClient::new(
        provider,
        Arc::clone(identity),
        Duration::from_secs(config.api_timeout_secs),
        config.log_api_requests,
    );
    match base_override {
        Some(url) => client.with_base_url(url),
        None => client,
    }
}
