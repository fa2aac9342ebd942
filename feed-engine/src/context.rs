use crate::config::FeedConfig;
use crate::hooks::FeedHooks;
use crate::runtime::FeedRuntime;
use crate::types::{FeedItem, WhyEntry, WhyKind, WhyReason};
use uuid::Uuid;

/// Append-only explainability trail for one feed run.
#[derive(Debug, Clone, Default)]
pub struct WhyLog {
    feed: String,
    entries: Vec<WhyEntry>,
}

impl WhyLog {
    pub fn new(feed: impl Into<String>) -> Self {
        Self {
            feed: feed.into(),
            entries: Vec::new(),
        }
    }

    /// Record that `item` was dropped. The returned entry can be enriched
    /// with root id, pubkey or pointer details.
    pub fn record(
        &mut self,
        stage: &str,
        kind: WhyKind,
        reason: WhyReason,
        item: &FeedItem,
    ) -> &mut WhyEntry {
        self.entries.push(WhyEntry {
            feed: self.feed.clone(),
            stage: stage.to_string(),
            kind,
            reason,
            video_id: item.video.id.clone(),
            root_id: None,
            pubkey: None,
            pointer: None,
        });
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    pub fn entries(&self) -> &[WhyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<WhyEntry> {
        self.entries
    }
}

/// Everything a source or stage may consult during one run.
///
/// Built fresh inside every `run_feed` call and dropped when it returns;
/// nothing in here outlives the run.
pub struct RunContext<'a> {
    feed_name: &'a str,
    run_id: Uuid,
    config: FeedConfig,
    runtime: &'a FeedRuntime,
    hooks: FeedHooks,
    why: WhyLog,
}

impl<'a> RunContext<'a> {
    pub fn new(feed_name: &'a str, runtime: &'a FeedRuntime, config: FeedConfig, hooks: FeedHooks) -> Self {
        Self {
            feed_name,
            run_id: Uuid::new_v4(),
            config,
            runtime,
            hooks,
            why: WhyLog::new(feed_name),
        }
    }

    pub fn feed_name(&self) -> &str {
        self.feed_name
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn runtime(&self) -> &'a FeedRuntime {
        self.runtime
    }

    pub fn hooks(&self) -> &FeedHooks {
        &self.hooks
    }

    pub fn why(&self) -> &WhyLog {
        &self.why
    }

    pub fn record_drop(
        &mut self,
        stage: &str,
        kind: WhyKind,
        reason: WhyReason,
        item: &FeedItem,
    ) -> &mut WhyEntry {
        self.why.record(stage, kind, reason, item)
    }

    pub(crate) fn finish(self) -> (Uuid, FeedConfig, WhyLog) {
        (self.run_id, self.config, self.why)
    }
}
