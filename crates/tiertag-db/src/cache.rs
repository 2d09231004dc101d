use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, warn};

use tiertag_model::TierProfile;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS player_tiers (
    uuid       TEXT PRIMARY KEY,
    username   TEXT NOT NULL,
    tier_data  TEXT NOT NULL,
    cached_at  TIMESTAMP NOT NULL,
    expires_at TIMESTAMP NOT NULL
)
"#;

#[derive(sqlx::FromRow)]
struct CacheRow {
    username: String,
    tier_data: String,
    cached_at: DateTime<Utc>,
}

/// SQLite-backed TTL cache keyed by account UUID
///
/// Rows past their `expires_at` are logically absent from reads even while
/// physically present; [`TierCache::sweep_expired`] reclaims them. Upserts
/// are single atomic statements, so concurrent writes for one key settle as
/// last-writer-wins without corrupting the row.
pub struct TierCache {
    pool: SqlitePool,
    ttl: Duration,
}

impl TierCache {
    /// Connect to the cache database and ensure the schema exists
    ///
    /// A connect failure here is the one storage error callers see; the
    /// service reacts by running cache-less rather than failing lookups.
    pub async fn connect(
        database_url: &str,
        pool_size: u32,
        ttl_minutes: i64,
    ) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .connect(database_url)
            .await?;

        sqlx::query(CREATE_TABLE_SQL).execute(&pool).await?;
        info!(ttl_minutes, "Tier cache initialized");

        Ok(Self {
            pool,
            ttl: Duration::minutes(ttl_minutes),
        })
    }

    /// The underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Return the cached profile for a UUID if it has not expired
    ///
    /// Re-attaches the row's `uuid`, `username`, and `cached_at` to the
    /// deserialized profile. Storage and decode errors degrade to a miss.
    pub async fn get_fresh(&self, uuid: &str) -> Option<TierProfile> {
        match self.try_get_fresh(uuid).await {
            Ok(row) => row,
            Err(e) => {
                warn!(uuid, error = %e, "Failed to read cached tier profile");
                None
            }
        }
    }

    async fn try_get_fresh(&self, uuid: &str) -> Result<Option<TierProfile>, sqlx::Error> {
        let row: Option<CacheRow> = sqlx::query_as(
            "SELECT username, tier_data, cached_at FROM player_tiers \
             WHERE uuid = ? AND expires_at > ?",
        )
        .bind(uuid)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        match TierProfile::from_json(&row.tier_data) {
            Ok(mut profile) => {
                profile.uuid = Some(uuid.to_string());
                profile.username = row.username;
                profile.cached_at = Some(row.cached_at);
                Ok(Some(profile))
            }
            Err(e) => {
                warn!(uuid, error = %e, "Cached tier profile is corrupt, treating as miss");
                Ok(None)
            }
        }
    }

    /// Insert or replace the cached profile for a UUID
    ///
    /// Computes `cached_at = now` and `expires_at = now + TTL`. Storage
    /// errors are logged and swallowed; a failed write only costs the next
    /// lookup a refetch.
    pub async fn upsert(&self, uuid: &str, username: &str, profile: &TierProfile) {
        if let Err(e) = self.try_upsert(uuid, username, profile).await {
            warn!(uuid, username, error = %e, "Failed to cache tier profile");
        }
    }

    async fn try_upsert(
        &self,
        uuid: &str,
        username: &str,
        profile: &TierProfile,
    ) -> Result<(), sqlx::Error> {
        let tier_data = profile
            .to_json()
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let now = Utc::now();
        let expires_at = now + self.ttl;

        sqlx::query(
            "INSERT INTO player_tiers (uuid, username, tier_data, cached_at, expires_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(uuid) DO UPDATE SET \
                 username = excluded.username, \
                 tier_data = excluded.tier_data, \
                 cached_at = excluded.cached_at, \
                 expires_at = excluded.expires_at",
        )
        .bind(uuid)
        .bind(username)
        .bind(tier_data)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        debug!(uuid, username, "Cached tier profile");
        Ok(())
    }

    /// Delete all expired rows; returns the number deleted (0 on error)
    pub async fn sweep_expired(&self) -> u64 {
        let result = sqlx::query("DELETE FROM player_tiers WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => {
                let deleted = done.rows_affected();
                if deleted > 0 {
                    debug!(deleted, "Swept expired cache entries");
                }
                deleted
            }
            Err(e) => {
                warn!(error = %e, "Failed to sweep expired cache entries");
                0
            }
        }
    }

    /// Delete every row; returns the number deleted (0 on error)
    pub async fn clear_all(&self) -> u64 {
        match sqlx::query("DELETE FROM player_tiers").execute(&self.pool).await {
            Ok(done) => {
                let deleted = done.rows_affected();
                info!(deleted, "Cleared tier cache");
                deleted
            }
            Err(e) => {
                warn!(error = %e, "Failed to clear tier cache");
                0
            }
        }
    }

    /// Close the connection pool, waiting for in-flight statements
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
