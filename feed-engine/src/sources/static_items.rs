use crate::context::RunContext;
use crate::traits::Source;
use crate::types::{FeedItem, Result};
use async_trait::async_trait;

/// Serves a fixed candidate list. Every run gets its own copy.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    items: Vec<FeedItem>,
}

impl StaticSource {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FeedItem>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Source for StaticSource {
    fn source_name(&self) -> String {
        "static".to_string()
    }

    async fn fetch(&self, _ctx: &RunContext<'_>) -> Result<Vec<FeedItem>> {
        Ok(self.items.clone())
    }
}
