//! Domain records for the feed and social graph
//!
//! `User` is the only struct that carries the password hash; everything that
//! leaves the crate goes through the `Author`/`UserProfile` projections,
//! which strip it by construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full user record, including the argon2 PHC hash. Never serialized into
/// feed or profile payloads.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Public projection of a user, used for the feed author join and the
/// follower/following detail lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
}

impl From<User> for Author {
    fn from(user: User) -> Self {
        Author {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
        }
    }
}

/// Authenticated identity resolved by the auth gate.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Registration input, validated at the boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Validated user row ready for insertion.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Comment embedded in a post. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(content: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            username: username.into(),
            created_at: Utc::now(),
        }
    }
}

/// Like embedded in a post; at most one per (post, username).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            created_at: Utc::now(),
        }
    }
}

/// Post input for addPost: content is required, the rest optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPost {
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub img_url: Option<String>,
}

/// Stored post with embedded comments and likes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub tags: Vec<String>,
    pub img_url: Option<String>,
    pub comments: Vec<Comment>,
    pub likes: Vec<Like>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post joined with its author, as served by the feed and cached verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub tags: Vec<String>,
    pub img_url: Option<String>,
    pub comments: Vec<Comment>,
    pub likes: Vec<Like>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Author,
}

/// Directed follow edge. Created once, never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl FollowEdge {
    pub fn new(follower_id: Uuid, following_id: Uuid) -> Self {
        Self {
            follower_id,
            following_id,
            created_at: Utc::now(),
        }
    }
}

/// User profile with both two-hop detail lists materialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub followings_detail: Vec<Author>,
    pub followers_detail: Vec<Author>,
}
