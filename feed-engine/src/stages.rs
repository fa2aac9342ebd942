use crate::context::RunContext;
use crate::hooks::{suppress_fn, SuppressFn};
use crate::runtime::FeedRuntime;
use crate::traits::Stage;
use crate::types::{FeedItem, Result, VideoRecord, WhyKind, WhyReason};
use crate::utils::normalize_tag;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Keeps only the newest revision of every `videoRootId` group.
pub struct DedupeByRootStage {
    stage_name: String,
}

impl DedupeByRootStage {
    pub fn new() -> Self {
        Self {
            stage_name: "dedupe-by-root".to_string(),
        }
    }

    pub fn with_stage_name(mut self, stage_name: impl Into<String>) -> Self {
        self.stage_name = stage_name.into();
        self
    }
}

#[async_trait]
impl Stage for DedupeByRootStage {
    fn stage_name(&self) -> String {
        self.stage_name.clone()
    }

    async fn apply(&self, items: Vec<FeedItem>, ctx: &mut RunContext<'_>) -> Result<Vec<FeedItem>> {
        debug!("Deduplicating {} items by root", items.len());

        // On equal timestamps the first item seen keeps its place.
        let mut newest: HashMap<&str, usize> = HashMap::new();
        for (index, item) in items.iter().enumerate() {
            let Some(root) = item.video.root_id() else {
                continue;
            };
            match newest.get(root) {
                Some(&current) if items[current].video.created_at >= item.video.created_at => {}
                _ => {
                    newest.insert(root, index);
                }
            }
        }
        let winners: HashSet<usize> = newest.into_values().collect();

        let mut survivors = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let superseded_root = item
                .video
                .root_id()
                .filter(|_| !winners.contains(&index))
                .map(str::to_string);

            if let Some(root) = superseded_root {
                ctx.record_drop(&self.stage_name, WhyKind::Dedupe, WhyReason::OlderRootVersion, &item)
                    .with_root_id(root);
                continue;
            }
            survivors.push(item);
        }

        Ok(survivors)
    }
}

impl Default for DedupeByRootStage {
    fn default() -> Self {
        Self::new()
    }
}

/// What an inclusion predicate may consult about the current run.
pub struct InclusionView<'a> {
    pub blacklisted_event_ids: &'a HashSet<String>,
    runtime: &'a FeedRuntime,
}

impl<'a> InclusionView<'a> {
    pub fn new(runtime: &'a FeedRuntime) -> Self {
        Self {
            blacklisted_event_ids: &runtime.blacklisted_event_ids,
            runtime,
        }
    }

    pub fn is_event_blacklisted(&self, event_id: &str) -> bool {
        self.blacklisted_event_ids.contains(event_id)
    }

    pub fn is_author_blocked(&self, pubkey: &str) -> bool {
        self.runtime.author_blocked(pubkey)
    }
}

pub type IncludeVideoFn = Arc<dyn Fn(&VideoRecord, &InclusionView<'_>) -> bool + Send + Sync>;

/// The usual moderation policy: drop blacklisted events and blocked authors.
pub fn include_unless_blacklisted(video: &VideoRecord, view: &InclusionView<'_>) -> bool {
    !view.is_event_blacklisted(&video.id) && !view.is_author_blocked(&video.pubkey)
}

/// Generic adapter around a caller-owned inclusion predicate.
pub struct BlacklistFilterStage {
    stage_name: String,
    should_include_video: IncludeVideoFn,
}

impl BlacklistFilterStage {
    pub fn new<F>(should_include_video: F) -> Self
    where
        F: Fn(&VideoRecord, &InclusionView<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            stage_name: "blacklist-filter".to_string(),
            should_include_video: Arc::new(should_include_video),
        }
    }

    pub fn with_stage_name(mut self, stage_name: impl Into<String>) -> Self {
        self.stage_name = stage_name.into();
        self
    }
}

impl Default for BlacklistFilterStage {
    fn default() -> Self {
        Self::new(include_unless_blacklisted)
    }
}

#[async_trait]
impl Stage for BlacklistFilterStage {
    fn stage_name(&self) -> String {
        self.stage_name.clone()
    }

    async fn apply(&self, items: Vec<FeedItem>, ctx: &mut RunContext<'_>) -> Result<Vec<FeedItem>> {
        let view = InclusionView::new(ctx.runtime());
        let mut results = Vec::with_capacity(items.len());

        for item in items {
            if (self.should_include_video)(&item.video, &view) {
                results.push(item);
                continue;
            }

            let pubkey = item.video.pubkey.clone();
            let entry = ctx.record_drop(&self.stage_name, WhyKind::Filter, WhyReason::Blacklist, &item);
            if !pubkey.is_empty() {
                entry.with_pubkey(pubkey);
            }
        }

        debug!("[{}] kept {} items", self.stage_name, results.len());
        Ok(results)
    }
}

/// Drops items the caller's watch-history hook asks to suppress.
///
/// The hook normally arrives per run through `hooks.watch_history`; a hook
/// bound with [`WatchHistorySuppressionStage::with_should_suppress`] wins.
pub struct WatchHistorySuppressionStage {
    stage_name: String,
    should_suppress: Option<SuppressFn>,
}

impl WatchHistorySuppressionStage {
    pub fn new() -> Self {
        Self {
            stage_name: "watch-history-suppression".to_string(),
            should_suppress: None,
        }
    }

    pub fn with_stage_name(mut self, stage_name: impl Into<String>) -> Self {
        self.stage_name = stage_name.into();
        self
    }

    pub fn with_should_suppress<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(FeedItem) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.should_suppress = Some(suppress_fn(hook));
        self
    }
}

impl Default for WatchHistorySuppressionStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for WatchHistorySuppressionStage {
    fn stage_name(&self) -> String {
        self.stage_name.clone()
    }

    async fn apply(&self, items: Vec<FeedItem>, ctx: &mut RunContext<'_>) -> Result<Vec<FeedItem>> {
        let hook = self
            .should_suppress
            .clone()
            .or_else(|| ctx.hooks().should_suppress().cloned());
        let Some(hook) = hook else {
            return Ok(items);
        };

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            if !hook(item.clone()).await? {
                results.push(item);
                continue;
            }

            let pointer = item.pointer.clone();
            let entry = ctx.record_drop(&self.stage_name, WhyKind::Filter, WhyReason::WatchHistory, &item);
            if let Some(pointer) = pointer {
                entry.with_pointer(pointer);
            }
        }

        debug!("[{}] kept {} items", self.stage_name, results.len());
        Ok(results)
    }
}

/// Applies `config.time_window`, dropping anything older than the window.
pub struct TimeWindowStage {
    stage_name: String,
}

impl TimeWindowStage {
    pub fn new() -> Self {
        Self {
            stage_name: "time-window".to_string(),
        }
    }
}

impl Default for TimeWindowStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for TimeWindowStage {
    fn stage_name(&self) -> String {
        self.stage_name.clone()
    }

    async fn apply(&self, items: Vec<FeedItem>, ctx: &mut RunContext<'_>) -> Result<Vec<FeedItem>> {
        let Some(window) = ctx.config().time_window else {
            return Ok(items);
        };
        let cutoff = window.cutoff(ctx.runtime().now_or_system());

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            if item.video.created_at >= cutoff {
                results.push(item);
            } else {
                ctx.record_drop(&self.stage_name, WhyKind::Filter, WhyReason::TimeWindow, &item);
            }
        }
        Ok(results)
    }
}

/// Applies `config.tag_filters`; an empty filter list keeps everything.
pub struct TagFilterStage {
    stage_name: String,
}

impl TagFilterStage {
    pub fn new() -> Self {
        Self {
            stage_name: "tag-filter".to_string(),
        }
    }
}

impl Default for TagFilterStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for TagFilterStage {
    fn stage_name(&self) -> String {
        self.stage_name.clone()
    }

    async fn apply(&self, items: Vec<FeedItem>, ctx: &mut RunContext<'_>) -> Result<Vec<FeedItem>> {
        let wanted: HashSet<String> = ctx
            .config()
            .tag_filters
            .iter()
            .map(|tag| normalize_tag(tag))
            .filter(|tag| !tag.is_empty())
            .collect();
        if wanted.is_empty() {
            return Ok(items);
        }

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let matches = item.video.tags.iter().any(|tag| wanted.contains(&normalize_tag(tag)));
            if matches {
                results.push(item);
            } else {
                ctx.record_drop(&self.stage_name, WhyKind::Filter, WhyReason::TagFilter, &item);
            }
        }
        Ok(results)
    }
}
