use crate::context::RunContext;
use crate::runtime::{AuthorBlockFn, FeedRuntime};
use crate::types::{FeedItem, PointerRef, Result, VideoRecord};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;

/// Produces the initial candidate list for a feed.
#[async_trait]
pub trait Source: Send + Sync {
    /// Name used in logs
    fn source_name(&self) -> String;

    async fn fetch(&self, ctx: &RunContext<'_>) -> Result<Vec<FeedItem>>;
}

/// One filtering/transformation step of a feed pipeline.
///
/// A stage returns the items that survive and records a why entry on `ctx`
/// for every item it drops.
#[async_trait]
pub trait Stage: Send + Sync {
    fn stage_name(&self) -> String;

    async fn apply(&self, items: Vec<FeedItem>, ctx: &mut RunContext<'_>) -> Result<Vec<FeedItem>>;
}

/// Orders the surviving items. Must be deterministic for identical input.
pub trait Sorter: Send + Sync {
    fn sort(&self, items: Vec<FeedItem>) -> Vec<FeedItem>;
}

impl<F> Sorter for F
where
    F: Fn(Vec<FeedItem>) -> Vec<FeedItem> + Send + Sync,
{
    fn sort(&self, items: Vec<FeedItem>) -> Vec<FeedItem> {
        self(items)
    }
}

/// Query options forwarded to the video service.
#[derive(Clone, Default)]
pub struct VideoQuery {
    pub blacklisted_event_ids: HashSet<String>,
    pub is_author_blocked: Option<AuthorBlockFn>,
    pub limit: Option<usize>,
}

impl VideoQuery {
    pub fn from_runtime(runtime: &FeedRuntime) -> Self {
        Self {
            blacklisted_event_ids: runtime.blacklisted_event_ids.clone(),
            is_author_blocked: runtime.is_author_blocked.clone(),
            limit: runtime.effective_limit(),
        }
    }

    pub fn author_blocked(&self, pubkey: &str) -> bool {
        self.is_author_blocked
            .as_ref()
            .map(|predicate| predicate(pubkey))
            .unwrap_or(false)
    }
}

impl fmt::Debug for VideoQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoQuery")
            .field("blacklisted_event_ids", &self.blacklisted_event_ids)
            .field("is_author_blocked", &self.is_author_blocked.is_some())
            .field("limit", &self.limit)
            .finish()
    }
}

/// The relay-backed video index the sources read from.
#[async_trait]
pub trait VideoService: Send + Sync {
    /// Targeted lookup for a known author set.
    async fn get_active_videos_by_authors(
        &self,
        authors: &[String],
        query: &VideoQuery,
    ) -> anyhow::Result<Vec<VideoRecord>>;

    /// Broad lookup over every active video.
    async fn get_filtered_active_videos(&self, query: &VideoQuery) -> anyhow::Result<Vec<VideoRecord>>;

    /// Targeted fetch used when the cached lookup has nothing for the authors.
    async fn fetch_videos_by_authors(
        &self,
        _authors: &[String],
        _query: &VideoQuery,
    ) -> anyhow::Result<Vec<VideoRecord>> {
        Ok(Vec::new())
    }
}

/// A pointer waiting in an actor's watch-history queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedPointer {
    pub pointer: PointerRef,
    pub video: Option<VideoRecord>,
    pub watched_at: Option<i64>,
}

impl QueuedPointer {
    pub fn new(pointer: PointerRef) -> Self {
        Self {
            pointer,
            video: None,
            watched_at: None,
        }
    }

    pub fn with_video(mut self, video: VideoRecord) -> Self {
        self.video = Some(video);
        self
    }

    pub fn with_watched_at(mut self, watched_at: i64) -> Self {
        self.watched_at = Some(watched_at);
        self
    }
}

#[async_trait]
pub trait WatchHistoryService: Send + Sync {
    async fn queued_pointers(&self, actor: Option<&str>) -> anyhow::Result<Vec<QueuedPointer>>;
}
