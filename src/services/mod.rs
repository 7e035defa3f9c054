pub mod auth;
pub mod feed;

pub use auth::AuthGate;
pub use feed::FeedReader;
