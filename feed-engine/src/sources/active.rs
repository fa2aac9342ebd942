use crate::context::RunContext;
use crate::sources::ACTIVE_SOURCE;
use crate::traits::{Source, VideoQuery, VideoService};
use crate::types::{FeedItem, ItemMetadata, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Broad source over every active video the service knows about.
pub struct ActiveVideosSource {
    service: Arc<dyn VideoService>,
}

impl ActiveVideosSource {
    pub fn new(service: Arc<dyn VideoService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Source for ActiveVideosSource {
    fn source_name(&self) -> String {
        ACTIVE_SOURCE.to_string()
    }

    async fn fetch(&self, ctx: &RunContext<'_>) -> Result<Vec<FeedItem>> {
        let query = VideoQuery::from_runtime(ctx.runtime());
        let videos = self.service.get_filtered_active_videos(&query).await?;
        debug!("Active source resolved {} videos", videos.len());

        Ok(videos
            .into_iter()
            .map(|video| FeedItem::new(video).with_metadata(ItemMetadata::from_source(ACTIVE_SOURCE)))
            .collect())
    }
}
