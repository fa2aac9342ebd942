#![allow(dead_code)]

use async_trait::async_trait;
use feed_engine::{FeedItem, QueuedPointer, VideoQuery, VideoRecord, VideoService, WatchHistoryService};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn video(id: &str, pubkey: &str, created_at: i64) -> VideoRecord {
    VideoRecord::new(id, pubkey, created_at)
}

pub fn rooted(id: &str, root: &str, created_at: i64) -> VideoRecord {
    VideoRecord::new(id, "pub1", created_at).with_root_id(root)
}

pub fn ids(items: &[FeedItem]) -> Vec<&str> {
    items.iter().map(|item| item.video_id()).collect()
}

/// In-memory video service that counts every call it receives.
#[derive(Default)]
pub struct MockVideoService {
    videos: Vec<VideoRecord>,
    fetched: Vec<VideoRecord>,
    reject_broad: bool,
    pub targeted_calls: AtomicUsize,
    pub broad_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub requested_authors: Mutex<Vec<Vec<String>>>,
    pub last_limit: Mutex<Option<usize>>,
}

impl MockVideoService {
    pub fn new(videos: Vec<VideoRecord>) -> Self {
        Self {
            videos,
            ..Self::default()
        }
    }

    pub fn with_fetched(mut self, fetched: Vec<VideoRecord>) -> Self {
        self.fetched = fetched;
        self
    }

    /// Fail the broad lookup so a test notices if it is ever used.
    pub fn rejecting_broad_lookup(mut self) -> Self {
        self.reject_broad = true;
        self
    }

    pub fn targeted(&self) -> usize {
        self.targeted_calls.load(Ordering::SeqCst)
    }

    pub fn broad(&self) -> usize {
        self.broad_calls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoService for MockVideoService {
    async fn get_active_videos_by_authors(
        &self,
        authors: &[String],
        query: &VideoQuery,
    ) -> anyhow::Result<Vec<VideoRecord>> {
        self.targeted_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_authors.lock().unwrap().push(authors.to_vec());
        *self.last_limit.lock().unwrap() = query.limit;
        Ok(self.videos.clone())
    }

    async fn get_filtered_active_videos(&self, _query: &VideoQuery) -> anyhow::Result<Vec<VideoRecord>> {
        self.broad_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_broad {
            anyhow::bail!("fallback lookup should not run when authors exist");
        }
        Ok(self.videos.clone())
    }

    async fn fetch_videos_by_authors(
        &self,
        _authors: &[String],
        _query: &VideoQuery,
    ) -> anyhow::Result<Vec<VideoRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fetched.clone())
    }
}

pub struct MockWatchHistoryService {
    pub queued: Vec<QueuedPointer>,
    pub actors: Mutex<Vec<Option<String>>>,
}

impl MockWatchHistoryService {
    pub fn new(queued: Vec<QueuedPointer>) -> Self {
        Self {
            queued,
            actors: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WatchHistoryService for MockWatchHistoryService {
    async fn queued_pointers(&self, actor: Option<&str>) -> anyhow::Result<Vec<QueuedPointer>> {
        self.actors.lock().unwrap().push(actor.map(str::to_string));
        Ok(self.queued.clone())
    }
}
