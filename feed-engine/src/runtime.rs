use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Decides whether an author pubkey is blocked. Owned by the moderation layer.
pub type AuthorBlockFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Caller-supplied state for a single feed run.
///
/// Nothing here is computed by the engine: subscription lists, blacklists and
/// block decisions all come from their owning services.
#[derive(Clone, Default)]
pub struct FeedRuntime {
    pub subscription_authors: Vec<String>,
    /// Equivalent to `subscription_authors`; consulted only when that is empty.
    pub authors: Vec<String>,
    pub blacklisted_event_ids: HashSet<String>,
    pub is_author_blocked: Option<AuthorBlockFn>,
    pub limit: Option<usize>,
    pub actor: Option<String>,
    /// Actor for watch-history lookups only; checked before `actor`.
    pub watch_history_actor: Option<String>,
    /// Unix seconds used as "now" by time-based stages. Falls back to the
    /// system clock when unset.
    pub now: Option<i64>,
}

impl FeedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscription_authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_blacklisted_event_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklisted_event_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_author_blocked<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.is_author_blocked = Some(Arc::new(predicate));
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_watch_history_actor(mut self, actor: impl Into<String>) -> Self {
        self.watch_history_actor = Some(actor.into());
        self
    }

    pub fn with_now(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }

    /// Nobody is blocked unless a predicate was supplied.
    pub fn author_blocked(&self, pubkey: &str) -> bool {
        self.is_author_blocked
            .as_ref()
            .map(|predicate| predicate(pubkey))
            .unwrap_or(false)
    }

    pub fn requested_authors(&self) -> &[String] {
        if self.subscription_authors.is_empty() {
            &self.authors
        } else {
            &self.subscription_authors
        }
    }

    /// Positive limits only; zero means "no limit".
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|limit| *limit > 0)
    }

    pub fn now_or_system(&self) -> i64 {
        self.now.unwrap_or_else(|| chrono::Utc::now().timestamp())
    }
}

impl fmt::Debug for FeedRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedRuntime")
            .field("subscription_authors", &self.subscription_authors)
            .field("authors", &self.authors)
            .field("blacklisted_event_ids", &self.blacklisted_event_ids)
            .field("is_author_blocked", &self.is_author_blocked.is_some())
            .field("limit", &self.limit)
            .field("actor", &self.actor)
            .field("watch_history_actor", &self.watch_history_actor)
            .field("now", &self.now)
            .finish()
    }
}
