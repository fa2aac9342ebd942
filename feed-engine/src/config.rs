use crate::types::Result;
use serde::{Deserialize, Serialize};

/// Rolling window relative to the run's "now" (e.g. the last 24 hours).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub seconds: i64,
}

impl TimeWindow {
    pub fn seconds(seconds: i64) -> Self {
        Self { seconds }
    }

    pub fn hours(hours: i64) -> Self {
        Self::seconds(hours * 3600)
    }

    pub fn days(days: i64) -> Self {
        Self::hours(days * 24)
    }

    /// Oldest `created_at` still inside the window.
    pub fn cutoff(&self, now: i64) -> i64 {
        now.saturating_sub(self.seconds.max(0))
    }
}

/// Final ordering of a feed. Only `recent` is implemented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Recent,
}

/// Per-feed configuration. Definitions carry defaults; a run may overlay
/// [`ConfigOverrides`] on top of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedConfig {
    /// Restrict results to a rolling time window.
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    /// Author pubkeys to include in the feed.
    #[serde(default)]
    pub actor_filters: Vec<String>,
    /// Tag identifiers to include in the feed.
    #[serde(default)]
    pub tag_filters: Vec<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Whose history a watch-history feed reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl FeedConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_actor_filters<I, S>(mut self, actors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actor_filters = actors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tag_filters<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_filters = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Shallow field-by-field merge: any field set in `overrides` wins.
    pub fn merged(&self, overrides: Option<&ConfigOverrides>) -> FeedConfig {
        let Some(overrides) = overrides else {
            return self.clone();
        };

        FeedConfig {
            time_window: overrides.time_window.or(self.time_window),
            actor_filters: overrides
                .actor_filters
                .clone()
                .unwrap_or_else(|| self.actor_filters.clone()),
            tag_filters: overrides
                .tag_filters
                .clone()
                .unwrap_or_else(|| self.tag_filters.clone()),
            sort_order: overrides.sort_order.unwrap_or(self.sort_order),
            actor: overrides.actor.clone().or_else(|| self.actor.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    #[serde(default)]
    pub actor_filters: Option<Vec<String>>,
    #[serde(default)]
    pub tag_filters: Option<Vec<String>>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub actor: Option<String>,
}

impl ConfigOverrides {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
