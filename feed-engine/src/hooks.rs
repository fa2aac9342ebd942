//! Async callbacks a caller can hand to a single feed run.
//!
//! Hooks are plain closures. A run owns its [`FeedHooks`] value for its whole
//! lifetime, so two concurrent runs never observe each other's callbacks.

use crate::types::{FeedItem, PointerRef, VideoRecord};
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub type SuppressFn = Arc<dyn Fn(FeedItem) -> BoxFuture<'static, anyhow::Result<bool>> + Send + Sync>;
pub type ResolveVideoFn =
    Arc<dyn Fn(PointerRef) -> BoxFuture<'static, anyhow::Result<Option<VideoRecord>>> + Send + Sync>;
pub type ResolveAuthorsFn = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Vec<String>>> + Send + Sync>;

pub(crate) fn suppress_fn<F, Fut>(hook: F) -> SuppressFn
where
    F: Fn(FeedItem) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
{
    Arc::new(move |item: FeedItem| hook(item).boxed())
}

/// Callbacks into the watch-history service.
#[derive(Clone, Default)]
pub struct WatchHistoryHooks {
    pub should_suppress: Option<SuppressFn>,
    pub resolve_video: Option<ResolveVideoFn>,
}

impl WatchHistoryHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_should_suppress<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(FeedItem) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.should_suppress = Some(suppress_fn(hook));
        self
    }

    pub fn with_resolve_video<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(PointerRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<VideoRecord>>> + Send + 'static,
    {
        let resolve: ResolveVideoFn = Arc::new(move |pointer: PointerRef| hook(pointer).boxed());
        self.resolve_video = Some(resolve);
        self
    }
}

/// Callbacks into the subscription service.
#[derive(Clone, Default)]
pub struct SubscriptionHooks {
    pub resolve_authors: Option<ResolveAuthorsFn>,
}

impl SubscriptionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolve_authors<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<String>>> + Send + 'static,
    {
        let resolve: ResolveAuthorsFn = Arc::new(move || hook().boxed());
        self.resolve_authors = Some(resolve);
        self
    }
}

#[derive(Clone, Default)]
pub struct FeedHooks {
    pub watch_history: Option<WatchHistoryHooks>,
    pub subscriptions: Option<SubscriptionHooks>,
}

impl FeedHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_watch_history(mut self, hooks: WatchHistoryHooks) -> Self {
        self.watch_history = Some(hooks);
        self
    }

    pub fn with_subscriptions(mut self, hooks: SubscriptionHooks) -> Self {
        self.subscriptions = Some(hooks);
        self
    }

    /// Overlay `overrides` on `self` key by key. A key present in `overrides`
    /// replaces the default group entirely.
    pub fn merged(&self, overrides: Option<FeedHooks>) -> FeedHooks {
        match overrides {
            None => self.clone(),
            Some(overrides) => FeedHooks {
                watch_history: overrides.watch_history.or_else(|| self.watch_history.clone()),
                subscriptions: overrides.subscriptions.or_else(|| self.subscriptions.clone()),
            },
        }
    }

    pub fn should_suppress(&self) -> Option<&SuppressFn> {
        self.watch_history.as_ref()?.should_suppress.as_ref()
    }

    pub fn resolve_video(&self) -> Option<&ResolveVideoFn> {
        self.watch_history.as_ref()?.resolve_video.as_ref()
    }

    pub fn resolve_authors(&self) -> Option<&ResolveAuthorsFn> {
        self.subscriptions.as_ref()?.resolve_authors.as_ref()
    }
}

impl fmt::Debug for FeedHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedHooks")
            .field("should_suppress", &self.should_suppress().is_some())
            .field("resolve_video", &self.resolve_video().is_some())
            .field("resolve_authors", &self.resolve_authors().is_some())
            .finish()
    }
}
