use std::collections::HashMap;

use tokio::sync::RwLock;

/// Registry of identifiers currently worth keeping fresh (e.g. online
/// players), consulted by the invalidation sweep after a provider change
///
/// Owned by the service and injected where needed; nothing reads it as
/// ambient global state.
#[derive(Debug, Default)]
pub struct TrackedPlayers {
    // uuid -> username
    inner: RwLock<HashMap<String, String>>,
}

impl TrackedPlayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a player
    pub async fn track(&self, uuid: &str, username: &str) {
        self.inner
            .write()
            .await
            .insert(uuid.to_string(), username.to_string());
    }

    /// Stop tracking a player
    pub async fn untrack(&self, uuid: &str) {
        self.inner.write().await.remove(uuid);
    }

    /// Snapshot of all tracked `(uuid, username)` pairs
    pub async fn snapshot(&self) -> Vec<(String, String)> {
        self.inner
            .read()
            .await
            .iter()
            .map(|(uuid, name)| (uuid.clone(), name.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_track_untrack_snapshot() {
        let tracked = TrackedPlayers::new();
        assert!(tracked.is_empty().await);

        tracked.track("uuid-1", "Steve").await;
        tracked.track("uuid-2", "Alex").await;
        assert_eq!(tracked.len().await, 2);

        let mut snapshot = tracked.snapshot().await;
        snapshot.sort();
        assert_eq!(
            snapshot,
            vec![
                ("uuid-1".to_string(), "Steve".to_string()),
                ("uuid-2".to_string(), "Alex".to_string()),
            ]
        );

        tracked.untrack("uuid-1").await;
        assert_eq!(tracked.len().await, 1);
    }

    #[tokio::test]
    async fn test_track_same_uuid_updates_username() {
        let tracked = TrackedPlayers::new();
        tracked.track("uuid-1", "Steve").await;
        tracked.track("uuid-1", "Steve_Renamed").await;

        assert_eq!(tracked.len().await, 1);
        assert_eq!(
            tracked.snapshot().await,
            vec![("uuid-1".to_string(), "Steve_Renamed".to_string())]
        );
    }
}
