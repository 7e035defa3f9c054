//! Feed-caching and social-graph core
//!
//! The data-consistency heart of a small social application: a read-through
//! feed cache with write-invalidation, idempotency-guarded like and follow
//! mutations backed by atomic conditional inserts, two-hop graph joins for
//! follower/following lists, and bearer-credential gating in front of every
//! identity-scoped operation. Transport, rendering, and session management
//! are external collaborators; [`app::App`] is the surface they embed.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod security;
pub mod services;
pub mod store;
pub mod validators;

pub use app::App;
pub use config::Settings;
pub use error::{AppError, ErrorKind, Result};

/// Install the tracing subscriber. Call once at startup from the embedding
/// binary; respects `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "social_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
