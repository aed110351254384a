pub mod auth;
pub mod context;
pub mod feed;
pub mod home;
pub mod providers;
pub mod ranker;
pub mod search;
pub mod session;
pub mod tracker;

pub use auth::{AuthBackend, HttpAuthBackend};
pub use context::ClientContext;
pub use feed::FeedGrower;
pub use home::{fetch_feed_head, FeedHead};
pub use providers::{MetadataProvider, TmdbProvider};
pub use ranker::GenreRanker;
pub use search::{recent_searches, remember_search, DebouncedSearch, SearchState};
pub use session::Session;
pub use tracker::InteractionTracker;
