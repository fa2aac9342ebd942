mod common;

use common::{ids, init_tracing, video, MockWatchHistoryService};
use feed_engine::{
    include_unless_blacklisted, register_watch_history_feed, ConfigOverrides, FeedEngine, FeedHooks, FeedItem,
    FeedRuntime, ItemMetadata, PointerRef, QueuedPointer, Result, RunOptions, Sorter, WatchHistoryHooks,
    WatchHistorySorter, WhyReason, WATCH_HISTORY_FEED,
};
use std::sync::Arc;
use tracing::info;

fn watched(value: &str, video_id: &str, watched_at: i64) -> QueuedPointer {
    QueuedPointer::new(PointerRef::event(value))
        .with_video(video(video_id, "pub1", 1))
        .with_watched_at(watched_at)
}

fn history_engine(queued: Vec<QueuedPointer>) -> Result<(FeedEngine, Arc<MockWatchHistoryService>)> {
    let service = Arc::new(MockWatchHistoryService::new(queued));
    let mut engine = FeedEngine::new();
    register_watch_history_feed(&mut engine, service.clone(), include_unless_blacklisted)?;
    Ok((engine, service))
}

#[tokio::test]
async fn test_repeat_watches_collapse_to_latest() -> Result<()> {
    init_tracing();

    let (engine, _) = history_engine(vec![
        watched("clip", "clip", 100),
        watched("other", "other", 300),
        watched("CLIP", "clip", 500),
    ])?;

    let result = engine.run_feed(WATCH_HISTORY_FEED, RunOptions::new()).await?;
    info!("Watch-history feed produced {:?}", result.video_ids());

    assert_eq!(result.video_ids(), vec!["clip", "other"]);
    assert_eq!(result.items[0].metadata.watched_at, Some(500));
    assert_eq!(result.items[0].metadata.pointer_key.as_deref(), Some("e:clip"));
    assert_eq!(result.items[1].metadata.watched_at, Some(300));
    Ok(())
}

#[tokio::test]
async fn test_history_ordered_by_watch_time_then_pointer() -> Result<()> {
    let (engine, _) = history_engine(vec![
        watched("stale", "stale", 100),
        watched("b", "b", 1_700_000_000),
        // Milliseconds are scaled down to seconds.
        watched("a", "a", 1_700_000_000_000),
        QueuedPointer::new(PointerRef::event("never")).with_video(video("never", "pub1", 1)),
    ])?;

    let result = engine.run_feed(WATCH_HISTORY_FEED, RunOptions::new()).await?;

    assert_eq!(result.video_ids(), vec!["a", "b", "stale", "never"]);
    assert_eq!(result.items[0].metadata.watched_at, Some(1_700_000_000));
    assert_eq!(result.items[3].metadata.watched_at, None);
    Ok(())
}

#[tokio::test]
async fn test_feed_filters_blacklist_then_suppression() -> Result<()> {
    let (engine, _) = history_engine(vec![
        watched("keep", "keep", 30),
        watched("banned", "banned", 20),
        watched("seen", "seen", 10),
    ])?;

    let descriptor = engine.feed_definition(WATCH_HISTORY_FEED).expect("feed registered");
    assert_eq!(descriptor.source, "watch-history");
    assert_eq!(descriptor.stages, vec!["blacklist-filter", "watch-history-suppression"]);
    assert!(descriptor.has_sorter);

    let hooks = FeedHooks::new().with_watch_history(
        WatchHistoryHooks::new()
            .with_should_suppress(|item: FeedItem| async move { anyhow::Ok(item.video.id == "seen") }),
    );
    let result = engine
        .run_feed(
            WATCH_HISTORY_FEED,
            RunOptions::new()
                .with_runtime(FeedRuntime::new().with_blacklisted_event_ids(["banned"]))
                .with_hooks(hooks),
        )
        .await?;

    assert_eq!(result.video_ids(), vec!["keep"]);
    let reasons: Vec<_> = result.why().iter().map(|entry| entry.reason).collect();
    assert_eq!(reasons, vec![WhyReason::Blacklist, WhyReason::WatchHistory]);
    assert_eq!(result.why()[1].pointer, Some(PointerRef::event("seen")));
    Ok(())
}

#[tokio::test]
async fn test_actor_resolution_order() -> Result<()> {
    let (engine, service) = history_engine(Vec::new())?;
    let config = ConfigOverrides {
        actor: Some("from-config".to_string()),
        ..ConfigOverrides::default()
    };

    let runtime = FeedRuntime::new().with_actor("from-runtime");
    engine
        .run_feed(
            WATCH_HISTORY_FEED,
            RunOptions::new()
                .with_runtime(runtime.clone().with_watch_history_actor("from-history"))
                .with_config(config.clone()),
        )
        .await?;
    engine
        .run_feed(
            WATCH_HISTORY_FEED,
            RunOptions::new()
                .with_runtime(runtime.clone().with_watch_history_actor("   "))
                .with_config(config),
        )
        .await?;
    engine
        .run_feed(WATCH_HISTORY_FEED, RunOptions::new().with_runtime(runtime))
        .await?;

    let actors = service.actors.lock().unwrap().clone();
    assert_eq!(
        actors,
        vec![
            Some("from-history".to_string()),
            Some("from-config".to_string()),
            Some("from-runtime".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn test_sorter_falls_back_to_pointer_key() {
    let item = |id: &str, watched_at: Option<i64>| FeedItem {
        video: video(id, "pub1", 1),
        pointer: Some(PointerRef::event(id)),
        metadata: ItemMetadata {
            watched_at,
            ..ItemMetadata::default()
        },
    };

    let sorted = WatchHistorySorter::new().sort(vec![
        item("z", Some(5)),
        item("b", None),
        item("a", None),
        item("y", Some(9)),
    ]);
    assert_eq!(ids(&sorted), vec!["y", "z", "a", "b"]);
}
