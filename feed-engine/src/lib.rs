//! Feed assembly pipeline: turns a candidate set of video records into a
//! ranked, filtered and explainable list for a named view.
//!
//! A [`FeedEngine`] holds named [`FeedDefinition`]s. Running a feed pulls
//! candidates from its [`Source`], folds them through each [`Stage`] in
//! registration order, orders the survivors with an optional [`Sorter`] and
//! returns the videos together with a per-run why log.

pub mod config;
pub mod context;
pub mod engine;
pub mod feeds;
pub mod hooks;
pub mod runtime;
pub mod sorters;
pub mod sources;
pub mod stages;
pub mod traits;
pub mod types;
pub mod utils;

pub use config::{ConfigOverrides, FeedConfig, SortOrder, TimeWindow};
pub use context::{RunContext, WhyLog};
pub use engine::{FeedDefinition, FeedDefinitionBuilder, FeedDescriptor, FeedEngine, FeedRunResult, RunMetadata, RunOptions};
pub use feeds::{register_watch_history_feed, watch_history_feed_definition, WATCH_HISTORY_FEED};
pub use hooks::{FeedHooks, SubscriptionHooks, WatchHistoryHooks};
pub use runtime::FeedRuntime;
pub use sorters::{ChronologicalSorter, WatchHistorySorter};
pub use sources::{ActiveVideosSource, StaticSource, SubscriptionAuthorsSource, WatchHistoryPointerSource};
pub use stages::{
    include_unless_blacklisted, BlacklistFilterStage, DedupeByRootStage, InclusionView, TagFilterStage,
    TimeWindowStage, WatchHistorySuppressionStage,
};
pub use traits::{QueuedPointer, Sorter, Source, Stage, VideoQuery, VideoService, WatchHistoryService};
pub use types::*;
