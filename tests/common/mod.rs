//! In-memory test doubles for the store and cache seams, plus a harness
//! that wires them into an `App`.
//!
//! The doubles uphold the same contracts as the PostgreSQL/Redis backends:
//! conditional inserts are atomic (a single lock guards check and write),
//! the feed is ordered by `updated_at` descending with ties in storage
//! order, and the cache stores the serialized payload verbatim.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use social_core::app::App;
use social_core::cache::FeedCache;
use social_core::config::JwtSettings;
use social_core::error::{AppError, Result};
use social_core::models::{
    Author, Comment, FeedPost, FollowEdge, Like, NewPost, NewUser, Post, RegisterInput, User,
};
use social_core::security::jwt::JwtCodec;
use social_core::store::{GraphStore, InsertOutcome, PostStore, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn author_of(&self, id: Uuid) -> Option<Author> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .map(Author::from)
    }

    pub fn id_of(&self, username: &str) -> Option<Uuid> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id)
    }

    /// Simulates a subject deleted after token issue.
    pub fn remove(&self, id: Uuid) {
        self.users.lock().unwrap().retain(|u| u.id != id);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_user(&self, user: NewUser) -> Result<Uuid> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::UsernameTaken);
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::EmailTaken);
        }

        let id = Uuid::new_v4();
        users.push(User {
            id,
            name: user.name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        });
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_author(&self, id: Uuid) -> Result<Option<Author>> {
        Ok(self.author_of(id))
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Author>> {
        let needle = keyword.to_lowercase();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle)
                    || u.username.to_lowercase().contains(&needle)
            })
            .cloned()
            .map(Author::from)
            .collect())
    }
}

pub struct MemoryPostStore {
    users: Arc<MemoryUserStore>,
    posts: Mutex<Vec<Post>>,
    pub feed_queries: AtomicUsize,
}

impl MemoryPostStore {
    pub fn new(users: Arc<MemoryUserStore>) -> Self {
        Self {
            users,
            posts: Mutex::new(Vec::new()),
            feed_queries: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn likes_of(&self, post_id: Uuid) -> Vec<Like> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| p.likes.clone())
            .unwrap_or_default()
    }

    fn join_author(&self, post: Post) -> Option<FeedPost> {
        let author = self.users.author_of(post.author_id)?;
        Some(FeedPost {
            id: post.id,
            author_id: post.author_id,
            content: post.content,
            tags: post.tags,
            img_url: post.img_url,
            comments: post.comments,
            likes: post.likes,
            created_at: post.created_at,
            updated_at: post.updated_at,
            author,
        })
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert_post(&self, author_id: Uuid, post: NewPost) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();
        self.posts.lock().unwrap().push(Post {
            id,
            author_id,
            content: post.content,
            tags: post.tags,
            img_url: post.img_url,
            comments: Vec::new(),
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn feed(&self) -> Result<Vec<FeedPost>> {
        self.feed_queries.fetch_add(1, Ordering::SeqCst);

        let mut snapshot = self.posts.lock().unwrap().clone();
        // Stable sort: ties keep storage order
        snapshot.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(snapshot
            .into_iter()
            .filter_map(|p| self.join_author(p))
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FeedPost>> {
        let post = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned();
        Ok(post.and_then(|p| self.join_author(p)))
    }

    async fn append_comment(&self, post_id: Uuid, comment: Comment) -> Result<()> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(AppError::NotFound("post"))?;

        post.comments.push(comment);
        post.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn insert_like(&self, post_id: Uuid, like: Like) -> Result<InsertOutcome> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(AppError::NotFound("post"))?;

        if post.likes.iter().any(|l| l.username == like.username) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        post.likes.push(like);
        Ok(InsertOutcome::Inserted)
    }
}

pub struct MemoryGraphStore {
    users: Arc<MemoryUserStore>,
    edges: Mutex<Vec<FollowEdge>>,
}

impl MemoryGraphStore {
    pub fn new(users: Arc<MemoryUserStore>) -> Self {
        Self {
            users,
            edges: Mutex::new(Vec::new()),
        }
    }

    pub fn edge_count(&self, follower_id: Uuid, following_id: Uuid) -> usize {
        self.edges
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.follower_id == follower_id && e.following_id == following_id)
            .count()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn insert_edge(&self, follower_id: Uuid, following_id: Uuid) -> Result<InsertOutcome> {
        let mut edges = self.edges.lock().unwrap();
        if edges
            .iter()
            .any(|e| e.follower_id == follower_id && e.following_id == following_id)
        {
            return Ok(InsertOutcome::AlreadyExists);
        }
        edges.push(FollowEdge::new(follower_id, following_id));
        Ok(InsertOutcome::Inserted)
    }

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<Author>> {
        let ids: Vec<Uuid> = self
            .edges
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.follower_id == user_id)
            .map(|e| e.following_id)
            .collect();

        Ok(ids.into_iter().filter_map(|id| self.users.author_of(id)).collect())
    }

    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<Author>> {
        let ids: Vec<Uuid> = self
            .edges
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.following_id == user_id)
            .map(|e| e.follower_id)
            .collect();

        Ok(ids.into_iter().filter_map(|id| self.users.author_of(id)).collect())
    }
}

/// Stores the serialized payload like the Redis backend does, so cache
/// round trips exercise the same serialization path.
#[derive(Default)]
pub struct MemoryFeedCache {
    entry: Mutex<Option<String>>,
    pub puts: AtomicUsize,
    pub invalidations: AtomicUsize,
}

impl MemoryFeedCache {
    pub fn raw(&self) -> Option<String> {
        self.entry.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedCache for MemoryFeedCache {
    async fn get(&self) -> Result<Option<Vec<FeedPost>>> {
        match self.entry.lock().unwrap().as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, feed: &[FeedPost]) -> Result<()> {
        let json = serde_json::to_string(feed)?;
        *self.entry.lock().unwrap() = Some(json);
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn invalidate(&self) -> Result<()> {
        *self.entry.lock().unwrap() = None;
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct TestApp {
    pub app: Arc<App>,
    pub users: Arc<MemoryUserStore>,
    pub posts: Arc<MemoryPostStore>,
    pub graph: Arc<MemoryGraphStore>,
    pub cache: Arc<MemoryFeedCache>,
}

pub fn test_app() -> TestApp {
    let users = Arc::new(MemoryUserStore::default());
    let posts = Arc::new(MemoryPostStore::new(users.clone()));
    let graph = Arc::new(MemoryGraphStore::new(users.clone()));
    let cache = Arc::new(MemoryFeedCache::default());

    let app = App::new(
        users.clone(),
        posts.clone(),
        graph.clone(),
        cache.clone(),
        JwtCodec::new(&JwtSettings {
            secret: "test-secret".into(),
            expiry_seconds: 3600,
        }),
    );

    TestApp {
        app: Arc::new(app),
        users,
        posts,
        graph,
        cache,
    }
}

pub fn register_input(name: &str, username: &str, email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        name: name.into(),
        username: username.into(),
        email: email.into(),
        password: password.into(),
    }
}

/// Register a user and return a ready-to-use bearer header value.
pub async fn register_and_login(
    app: &App,
    name: &str,
    username: &str,
    email: &str,
    password: &str,
) -> String {
    app.register(register_input(name, username, email, password))
        .await
        .expect("registration should succeed");
    let token = app.login(email, password).await.expect("login should succeed");
    format!("Bearer {token}")
}
