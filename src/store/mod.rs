//! Storage seams for users, posts, and the follow graph
//!
//! The orchestrator is injected with `Arc<dyn ...>` handles behind these
//! traits; production backends live in [`postgres`], and the test suite
//! slots in-memory doubles behind the same seams.
//!
//! Uniqueness invariants (one follow edge per ordered pair, one like per
//! post/username) are the backend's responsibility: the conditional inserts
//! must be atomic and report the tagged [`InsertOutcome`], never a racy
//! check-then-insert.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Author, Comment, FeedPost, Like, NewPost, NewUser, User};

/// Result of an atomic conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Username/email uniqueness is enforced atomically
    /// by the backend; violations surface as `UsernameTaken`/`EmailTaken`.
    async fn insert_user(&self, user: NewUser) -> Result<Uuid>;

    /// Full record (with password hash) for credential verification.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Public projection by id; used by the auth gate and profile joins.
    async fn find_author(&self, id: Uuid) -> Result<Option<Author>>;

    /// Users whose name or username contains the keyword, case-insensitive.
    async fn search(&self, keyword: &str) -> Result<Vec<Author>>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, author_id: Uuid, post: NewPost) -> Result<Uuid>;

    /// All posts joined with their author, ordered by `updated_at`
    /// descending; ties keep storage order.
    async fn feed(&self) -> Result<Vec<FeedPost>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FeedPost>>;

    /// Append a comment and bump the post's `updated_at`.
    /// Fails with `NotFound` when the post does not exist.
    async fn append_comment(&self, post_id: Uuid, comment: Comment) -> Result<()>;

    /// Atomic conditional like append, keyed by username.
    /// Fails with `NotFound` when the post does not exist.
    async fn insert_like(&self, post_id: Uuid, like: Like) -> Result<InsertOutcome>;
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Atomic conditional edge insert for the ordered pair.
    async fn insert_edge(&self, follower_id: Uuid, following_id: Uuid) -> Result<InsertOutcome>;

    /// Users that `user_id` follows, joined to their records, in edge
    /// insertion order.
    async fn following_of(&self, user_id: Uuid) -> Result<Vec<Author>>;

    /// Users following `user_id`, joined to their records, in edge
    /// insertion order.
    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<Author>>;
}
