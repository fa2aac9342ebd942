use serde::{Deserialize, Serialize};
use std::fmt;

/// A video event as produced by the upstream video service.
///
/// The engine only ever reads these fields; the record itself is owned by
/// whatever relay/cache layer produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    #[serde(rename = "videoRootId", default, skip_serializing_if = "Option::is_none")]
    pub video_root_id: Option<String>,
    #[serde(default)]
    pub pubkey: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: VideoMetadata,
}

impl VideoRecord {
    pub fn new(id: impl Into<String>, pubkey: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: id.into(),
            video_root_id: None,
            pubkey: pubkey.into(),
            created_at,
            title: None,
            tags: Vec::new(),
            metadata: VideoMetadata::default(),
        }
    }

    pub fn with_root_id(mut self, root_id: impl Into<String>) -> Self {
        self.video_root_id = Some(root_id.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_trusted_muted(mut self, trusted_muted: bool) -> Self {
        self.metadata.moderation.trusted_muted = trusted_muted;
        self
    }

    /// Root id used for revision grouping. Empty strings count as "no root".
    pub fn root_id(&self) -> Option<&str> {
        self.video_root_id.as_deref().filter(|root| !root.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub moderation: ModerationFlags,
}

/// Moderation annotations computed upstream by the trust layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationFlags {
    #[serde(default)]
    pub trusted_muted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerKind {
    #[serde(rename = "e")]
    Event,
    #[serde(rename = "a")]
    Address,
}

impl PointerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointerKind::Event => "e",
            PointerKind::Address => "a",
        }
    }
}

/// Reference to a Nostr event (`e`) or addressable event (`a`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerRef {
    #[serde(rename = "type")]
    pub kind: PointerKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay: Option<String>,
}

impl PointerRef {
    pub fn event(value: impl Into<String>) -> Self {
        Self {
            kind: PointerKind::Event,
            value: value.into(),
            relay: None,
        }
    }

    pub fn address(value: impl Into<String>) -> Self {
        Self {
            kind: PointerKind::Address,
            value: value.into(),
            relay: None,
        }
    }

    pub fn with_relay(mut self, relay: impl Into<String>) -> Self {
        self.relay = Some(relay.into());
        self
    }

    /// Stable lookup key, e.g. `e:abc123`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.value.trim().to_lowercase())
    }
}

/// Per-item annotations attached by sources and stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer_key: Option<String>,
    /// Unix seconds of the most recent watch, for watch-history items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ItemMetadata {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }
}

/// The unit flowing through a feed pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub video: VideoRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<PointerRef>,
    #[serde(default)]
    pub metadata: ItemMetadata,
}

impl FeedItem {
    pub fn new(video: VideoRecord) -> Self {
        Self {
            video,
            pointer: None,
            metadata: ItemMetadata::default(),
        }
    }

    pub fn with_pointer(mut self, pointer: PointerRef) -> Self {
        self.pointer = Some(pointer);
        self
    }

    pub fn with_metadata(mut self, metadata: ItemMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_moderation(mut self, moderation: ModerationFlags) -> Self {
        self.metadata.moderation = Some(moderation);
        self
    }

    pub fn video_id(&self) -> &str {
        &self.video.id
    }

    /// True when either the item annotations or the record itself carry a
    /// trusted-mute flag.
    pub fn is_trusted_muted(&self) -> bool {
        self.metadata
            .moderation
            .map(|flags| flags.trusted_muted)
            .unwrap_or(false)
            || self.video.metadata.moderation.trusted_muted
    }
}

impl From<VideoRecord> for FeedItem {
    fn from(video: VideoRecord) -> Self {
        Self::new(video)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhyKind {
    Dedupe,
    Filter,
}

/// Why a candidate was excluded from a feed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhyReason {
    OlderRootVersion,
    Blacklist,
    WatchHistory,
    TimeWindow,
    TagFilter,
}

impl WhyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhyReason::OlderRootVersion => "older-root-version",
            WhyReason::Blacklist => "blacklist",
            WhyReason::WatchHistory => "watch-history",
            WhyReason::TimeWindow => "time-window",
            WhyReason::TagFilter => "tag-filter",
        }
    }
}

impl fmt::Display for WhyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One explainability record. Exactly one is written per dropped item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhyEntry {
    pub feed: String,
    pub stage: String,
    #[serde(rename = "type")]
    pub kind: WhyKind,
    pub reason: WhyReason,
    pub video_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<PointerRef>,
}

impl WhyEntry {
    pub fn with_root_id(&mut self, root_id: impl Into<String>) -> &mut Self {
        self.root_id = Some(root_id.into());
        self
    }

    pub fn with_pubkey(&mut self, pubkey: impl Into<String>) -> &mut Self {
        self.pubkey = Some(pubkey.into());
        self
    }

    pub fn with_pointer(&mut self, pointer: PointerRef) -> &mut Self {
        self.pointer = Some(pointer);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Feed \"{name}\" is not registered")]
    FeedNotFound { name: String },

    #[error("Feed name must be a non-empty string")]
    InvalidFeedName,

    #[error("Feed \"{name}\" is already registered")]
    FeedAlreadyRegistered { name: String },

    #[error("Invalid feed configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;
