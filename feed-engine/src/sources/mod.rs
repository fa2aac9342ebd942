pub mod active;
pub mod static_items;
pub mod subscriptions;
pub mod watch_history;

pub use active::ActiveVideosSource;
pub use static_items::StaticSource;
pub use subscriptions::SubscriptionAuthorsSource;
pub use watch_history::WatchHistoryPointerSource;

pub const ACTIVE_SOURCE: &str = "nostr:active";
pub const SUBSCRIPTIONS_SOURCE: &str = "nostr:subscriptions";
pub const WATCH_HISTORY_SOURCE: &str = "watch-history";
