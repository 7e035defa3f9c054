//! Cache-aside feed read path

use std::sync::Arc;
use tracing::debug;

use crate::cache::FeedCache;
use crate::error::Result;
use crate::models::FeedPost;
use crate::store::PostStore;

pub struct FeedReader {
    posts: Arc<dyn PostStore>,
    cache: Arc<dyn FeedCache>,
}

impl FeedReader {
    pub fn new(posts: Arc<dyn PostStore>, cache: Arc<dyn FeedCache>) -> Self {
        Self { posts, cache }
    }

    /// Serve the feed from cache, populating it from the post store on a
    /// miss. The populated entry has no expiry; it lives until the next
    /// content-affecting mutation invalidates it.
    pub async fn get_feed(&self) -> Result<Vec<FeedPost>> {
        if let Some(feed) = self.cache.get().await? {
            return Ok(feed);
        }

        let feed = self.posts.feed().await?;
        self.cache.put(&feed).await?;
        debug!(posts = feed.len(), "Feed repopulated from post store");

        Ok(feed)
    }

    /// Drop the cached feed. Called by every mutation that changes visible
    /// feed content, before that mutation acknowledges.
    pub async fn invalidate(&self) -> Result<()> {
        self.cache.invalidate().await
    }
}
