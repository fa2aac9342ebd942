use crate::context::RunContext;
use crate::sources::WATCH_HISTORY_SOURCE;
use crate::traits::{QueuedPointer, Source, WatchHistoryService};
use crate::types::{FeedItem, ItemMetadata, Result};
use crate::utils::{first_non_empty, normalize_watched_at};
use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Replays an actor's watch history as feed items, one per pointer.
///
/// Repeat watches of the same pointer collapse to the most recent one, and
/// the result is ordered by watch time, newest first. Pointers without an
/// embedded video go through the `watch_history.resolve_video` hook; anything
/// still unresolved is skipped.
pub struct WatchHistoryPointerSource {
    service: Arc<dyn WatchHistoryService>,
}

impl WatchHistoryPointerSource {
    pub fn new(service: Arc<dyn WatchHistoryService>) -> Self {
        Self { service }
    }
}

/// Latest entry per pointer key, ordered by watch time desc then key.
fn latest_per_pointer(queued: Vec<QueuedPointer>) -> Vec<(String, i64, QueuedPointer)> {
    let mut latest: HashMap<String, (i64, QueuedPointer)> = HashMap::new();
    for entry in queued {
        let watched_at = normalize_watched_at(entry.watched_at);
        match latest.entry(entry.pointer.key()) {
            Entry::Occupied(mut slot) => {
                if slot.get().0 < watched_at {
                    slot.insert((watched_at, entry));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert((watched_at, entry));
            }
        }
    }

    let mut history: Vec<_> = latest
        .into_iter()
        .map(|(key, (watched_at, entry))| (key, watched_at, entry))
        .collect();
    history.sort_by(|(a_key, a_at, _), (b_key, b_at, _)| b_at.cmp(a_at).then_with(|| a_key.cmp(b_key)));
    history
}

#[async_trait]
impl Source for WatchHistoryPointerSource {
    fn source_name(&self) -> String {
        WATCH_HISTORY_SOURCE.to_string()
    }

    async fn fetch(&self, ctx: &RunContext<'_>) -> Result<Vec<FeedItem>> {
        let runtime = ctx.runtime();
        let actor = first_non_empty([
            runtime.watch_history_actor.as_deref(),
            ctx.config().actor.as_deref(),
            runtime.actor.as_deref(),
        ]);
        let queued = self.service.queued_pointers(actor.as_deref()).await?;
        let queued_len = queued.len();
        let history = latest_per_pointer(queued);
        let resolve_video = ctx.hooks().resolve_video().cloned();

        let mut items = Vec::with_capacity(history.len());
        for (key, watched_at, entry) in history {
            let video = match (entry.video, &resolve_video) {
                (Some(video), _) => Some(video),
                (None, Some(resolve)) => resolve(entry.pointer.clone()).await?,
                (None, None) => None,
            };
            let Some(video) = video else {
                debug!("Skipping unresolved pointer {}", key);
                continue;
            };

            let metadata = ItemMetadata {
                actor: actor.clone(),
                pointer_key: Some(key),
                watched_at: (watched_at > 0).then_some(watched_at),
                ..ItemMetadata::from_source(WATCH_HISTORY_SOURCE)
            };
            items.push(FeedItem::new(video).with_pointer(entry.pointer).with_metadata(metadata));
        }

        debug!(
            "Watch-history source produced {} items from {} queued entries",
            items.len(),
            queued_len
        );
        Ok(items)
    }
}
