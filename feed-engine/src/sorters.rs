use crate::traits::Sorter;
use crate::types::{FeedItem, PointerRef};
use std::cmp::{Ordering, Reverse};

/// Newest first, with trusted-muted items pushed below everything else.
///
/// Demoted items are never removed. Equal timestamps fall back to the video
/// id so the order is total.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronologicalSorter;

impl ChronologicalSorter {
    pub fn new() -> Self {
        Self
    }
}

fn newest_first(a: &FeedItem, b: &FeedItem) -> Ordering {
    b.video
        .created_at
        .cmp(&a.video.created_at)
        .then_with(|| a.video.id.cmp(&b.video.id))
}

impl Sorter for ChronologicalSorter {
    fn sort(&self, items: Vec<FeedItem>) -> Vec<FeedItem> {
        let (mut demoted, mut normal): (Vec<_>, Vec<_>) =
            items.into_iter().partition(FeedItem::is_trusted_muted);

        normal.sort_by(newest_first);
        demoted.sort_by(newest_first);

        normal.extend(demoted);
        normal
    }
}

/// Most recently watched first; equal watch times order by pointer key.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchHistorySorter;

impl WatchHistorySorter {
    pub fn new() -> Self {
        Self
    }
}

fn pointer_key(item: &FeedItem) -> String {
    item.metadata
        .pointer_key
        .clone()
        .or_else(|| item.pointer.as_ref().map(PointerRef::key))
        .unwrap_or_default()
}

impl Sorter for WatchHistorySorter {
    fn sort(&self, mut items: Vec<FeedItem>) -> Vec<FeedItem> {
        items.sort_by_cached_key(|item| (Reverse(item.metadata.watched_at.unwrap_or(0)), pointer_key(item)));
        items
    }
}
