pub mod feeds;
pub mod metadata;
pub mod routes;
pub mod search;
pub mod session;
pub mod state;

pub use routes::create_router;
pub use state::{AppState, FeedSettings};
