use crate::context::RunContext;
use crate::sources::SUBSCRIPTIONS_SOURCE;
use crate::traits::{Source, VideoQuery, VideoService};
use crate::types::{FeedItem, ItemMetadata, Result};
use crate::utils::normalize_author;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Author-targeted source for the subscriptions view.
///
/// Only ever issues the targeted author lookup. With no authors to narrow to
/// it returns nothing instead of falling back to the broad active query.
pub struct SubscriptionAuthorsSource {
    service: Arc<dyn VideoService>,
}

impl SubscriptionAuthorsSource {
    pub fn new(service: Arc<dyn VideoService>) -> Self {
        Self { service }
    }

    async fn resolve_authors(&self, ctx: &RunContext<'_>) -> Result<Vec<String>> {
        let mut hook_authors = Vec::new();
        if let Some(resolve) = ctx.hooks().resolve_authors().cloned() {
            hook_authors = resolve().await?;
        }

        let candidates = ctx
            .runtime()
            .requested_authors()
            .iter()
            .chain(ctx.config().actor_filters.iter())
            .chain(hook_authors.iter());

        let mut seen = HashSet::new();
        let mut authors = Vec::new();
        for candidate in candidates {
            let author = normalize_author(candidate);
            if !author.is_empty() && seen.insert(author.clone()) {
                authors.push(author);
            }
        }
        Ok(authors)
    }
}

#[async_trait]
impl Source for SubscriptionAuthorsSource {
    fn source_name(&self) -> String {
        SUBSCRIPTIONS_SOURCE.to_string()
    }

    async fn fetch(&self, ctx: &RunContext<'_>) -> Result<Vec<FeedItem>> {
        let authors = self.resolve_authors(ctx).await?;
        debug!("Subscriptions source resolved {} authors", authors.len());

        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let query = VideoQuery::from_runtime(ctx.runtime());
        let mut videos = self
            .service
            .get_active_videos_by_authors(&authors, &query)
            .await?;

        if videos.is_empty() {
            debug!("Targeted lookup returned nothing, fetching by authors");
            videos = self.service.fetch_videos_by_authors(&authors, &query).await?;
        }

        let wanted: HashSet<&str> = authors.iter().map(String::as_str).collect();
        let mut matched: Vec<(String, _)> = videos
            .into_iter()
            .filter_map(|video| {
                let author = normalize_author(&video.pubkey);
                wanted.contains(author.as_str()).then_some((author, video))
            })
            .collect();

        matched.sort_by(|(_, a), (_, b)| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(matched
            .into_iter()
            .map(|(author, video)| {
                let metadata = ItemMetadata {
                    matched_author: Some(author),
                    ..ItemMetadata::from_source(SUBSCRIPTIONS_SOURCE)
                };
                FeedItem::new(video).with_metadata(metadata)
            })
            .collect())
    }
}
