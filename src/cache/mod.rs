//! Feed cache layer
//!
//! A single shared entry holding the serialized feed (posts joined with
//! author). Populated lazily on a miss, deleted by every content-affecting
//! mutation, stored with no expiry. Concurrent population after a
//! simultaneous miss is last-writer-wins.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;

use crate::error::Result;
use crate::models::FeedPost;

/// The one cache key the feed lives under.
pub const FEED_CACHE_KEY: &str = "feed:all";

#[async_trait]
pub trait FeedCache: Send + Sync {
    /// Cached feed, or None on a miss.
    async fn get(&self) -> Result<Option<Vec<FeedPost>>>;

    /// Replace the cached feed. No expiry.
    async fn put(&self, feed: &[FeedPost]) -> Result<()>;

    /// Delete the cached entry. Must complete before the triggering
    /// mutation acknowledges.
    async fn invalidate(&self) -> Result<()>;
}

/// Redis-backed feed cache.
#[derive(Clone)]
pub struct RedisFeedCache {
    conn: ConnectionManager,
}

impl RedisFeedCache {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl FeedCache for RedisFeedCache {
    async fn get(&self) -> Result<Option<Vec<FeedPost>>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(FEED_CACHE_KEY)
            .query_async(&mut self.conn.clone())
            .await?;

        match value {
            Some(json) => {
                let feed = serde_json::from_str::<Vec<FeedPost>>(&json)?;
                debug!(posts = feed.len(), "Feed cache hit");
                Ok(Some(feed))
            }
            None => {
                debug!("Feed cache miss");
                Ok(None)
            }
        }
    }

    async fn put(&self, feed: &[FeedPost]) -> Result<()> {
        let json = serde_json::to_string(feed)?;

        redis::cmd("SET")
            .arg(FEED_CACHE_KEY)
            .arg(&json)
            .query_async::<_, ()>(&mut self.conn.clone())
            .await?;

        debug!(posts = feed.len(), "Feed cache populated");
        Ok(())
    }

    async fn invalidate(&self) -> Result<()> {
        redis::cmd("DEL")
            .arg(FEED_CACHE_KEY)
            .query_async::<_, ()>(&mut self.conn.clone())
            .await?;

        debug!("Feed cache invalidated");
        Ok(())
    }
}
