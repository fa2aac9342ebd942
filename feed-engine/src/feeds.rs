//! Ready-made feed definitions.

use crate::engine::{FeedDefinition, FeedDescriptor, FeedEngine};
use crate::sorters::WatchHistorySorter;
use crate::sources::WatchHistoryPointerSource;
use crate::stages::{BlacklistFilterStage, InclusionView, WatchHistorySuppressionStage};
use crate::traits::WatchHistoryService;
use crate::types::{Result, VideoRecord};
use std::sync::Arc;

pub const WATCH_HISTORY_FEED: &str = "watch-history";

/// The watch-history feed: latest watch per pointer, moderation filter,
/// per-run suppression hook, ordered by watch time.
pub fn watch_history_feed_definition<F>(
    service: Arc<dyn WatchHistoryService>,
    should_include_video: F,
) -> FeedDefinition
where
    F: Fn(&VideoRecord, &InclusionView<'_>) -> bool + Send + Sync + 'static,
{
    FeedDefinition::builder(WatchHistoryPointerSource::new(service))
        .add_stage(BlacklistFilterStage::new(should_include_video))
        .add_stage(WatchHistorySuppressionStage::new())
        .sorter(WatchHistorySorter::new())
        .build()
}

pub fn register_watch_history_feed<F>(
    engine: &mut FeedEngine,
    service: Arc<dyn WatchHistoryService>,
    should_include_video: F,
) -> Result<FeedDescriptor>
where
    F: Fn(&VideoRecord, &InclusionView<'_>) -> bool + Send + Sync + 'static,
{
    engine.register_feed(
        WATCH_HISTORY_FEED,
        watch_history_feed_definition(service, should_include_video),
    )
}
