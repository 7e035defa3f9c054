//! Request-level orchestration
//!
//! `App` composes the auth gate, stores, and feed cache into the public
//! operation surface the transport layer embeds. Every identity-scoped
//! operation resolves the bearer credential first; content-affecting writes
//! invalidate the feed cache before acknowledging. No operation spans a
//! transaction across stores and cache — a crash between the domain write
//! and the invalidation leaves a stale cache entry, which the next
//! mutation clears.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use uuid::Uuid;

use crate::cache::{FeedCache, RedisFeedCache};
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::models::{
    FeedPost, Identity, NewPost, NewUser, RegisterInput, UserProfile,
};
use crate::security::jwt::JwtCodec;
use crate::security::password::{hash_password, verify_password};
use crate::services::{AuthGate, FeedReader};
use crate::store::postgres::{PgGraphStore, PgPostStore, PgUserStore};
use crate::store::{GraphStore, InsertOutcome, PostStore, UserStore};
use crate::validators;

pub struct App {
    users: Arc<dyn UserStore>,
    graph: Arc<dyn GraphStore>,
    feed: FeedReader,
    auth: AuthGate,
    posts: Arc<dyn PostStore>,
    jwt: Arc<JwtCodec>,
}

impl App {
    /// Wire an orchestrator from explicit handles. Tests pass in-memory
    /// doubles; production wiring goes through [`App::connect`].
    pub fn new(
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        graph: Arc<dyn GraphStore>,
        cache: Arc<dyn FeedCache>,
        jwt: JwtCodec,
    ) -> Self {
        let jwt = Arc::new(jwt);
        Self {
            auth: AuthGate::new(users.clone(), jwt.clone()),
            feed: FeedReader::new(posts.clone(), cache),
            users,
            posts,
            graph,
            jwt,
        }
    }

    /// Production bootstrap: PostgreSQL pool (migrations applied), Redis
    /// connection manager, and the JWT codec, all built once from settings
    /// and passed in explicitly.
    pub async fn connect(settings: &Settings) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.database.max_connections)
            .min_connections(settings.database.min_connections)
            .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout_secs))
            .connect(&settings.database.url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        let cache = RedisFeedCache::connect(&settings.redis.url)
            .await
            .context("Failed to connect to Redis")?;

        info!("Connected to PostgreSQL and Redis");

        Ok(Self::new(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgPostStore::new(pool.clone())),
            Arc::new(PgGraphStore::new(pool)),
            Arc::new(cache),
            JwtCodec::new(&settings.jwt),
        ))
    }

    // ---- account operations (no identity required) ----

    pub async fn register(&self, input: RegisterInput) -> Result<()> {
        validators::require("Name", &input.name)?;
        validators::require("Username", &input.username)?;
        validators::require("Email", &input.email)?;
        validators::require("Password", &input.password)?;

        if !validators::validate_password(&input.password) {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters long",
                validators::MIN_PASSWORD_LEN
            )));
        }
        if !validators::validate_email(&input.email) {
            return Err(AppError::Validation("Invalid email format".into()));
        }

        let password_hash = hash_password(&input.password)?;
        let id = self
            .users
            .insert_user(NewUser {
                name: input.name,
                username: input.username,
                email: input.email,
                password_hash,
            })
            .await?;

        info!(user_id = %id, "User registered");
        Ok(())
    }

    /// Exchange email + password for an access token. Unknown email and
    /// wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.jwt.issue(user.id, &user.username, &user.email)?;
        info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    // ---- feed operations ----

    pub async fn get_feed(&self, bearer: Option<&str>) -> Result<Vec<FeedPost>> {
        self.auth.authenticate(bearer).await?;
        self.feed.get_feed().await
    }

    pub async fn get_post_by_id(&self, bearer: Option<&str>, id: Uuid) -> Result<FeedPost> {
        self.auth.authenticate(bearer).await?;
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("post"))
    }

    pub async fn add_post(&self, bearer: Option<&str>, post: NewPost) -> Result<()> {
        let identity = self.auth.authenticate(bearer).await?;
        validators::require("Content", &post.content)?;

        let id = self.posts.insert_post(identity.id, post).await?;
        self.feed.invalidate().await?;

        info!(post_id = %id, author = %identity.username, "Post added");
        Ok(())
    }

    pub async fn comment_post(
        &self,
        bearer: Option<&str>,
        post_id: Uuid,
        content: &str,
    ) -> Result<()> {
        let identity = self.auth.authenticate(bearer).await?;
        validators::require("Comment content", content)?;
        validators::require("Username", &identity.username)?;

        self.posts
            .append_comment(post_id, crate::models::Comment::new(content, identity.username))
            .await?;
        self.feed.invalidate().await?;

        Ok(())
    }

    pub async fn like_post(&self, bearer: Option<&str>, post_id: Uuid) -> Result<()> {
        let identity = self.auth.authenticate(bearer).await?;

        match self
            .posts
            .insert_like(post_id, crate::models::Like::new(identity.username))
            .await?
        {
            InsertOutcome::Inserted => {
                self.feed.invalidate().await?;
                Ok(())
            }
            InsertOutcome::AlreadyExists => Err(AppError::AlreadyLiked),
        }
    }

    // ---- graph operations ----

    pub async fn follow_user(&self, bearer: Option<&str>, following_id: Uuid) -> Result<()> {
        let identity = self.auth.authenticate(bearer).await?;

        if identity.id == following_id {
            return Err(AppError::SelfFollow);
        }

        match self.graph.insert_edge(identity.id, following_id).await? {
            InsertOutcome::Inserted => {
                info!(follower = %identity.id, following = %following_id, "Follow created");
                Ok(())
            }
            InsertOutcome::AlreadyExists => Err(AppError::DuplicateFollow),
        }
    }

    pub async fn get_profile(&self, bearer: Option<&str>) -> Result<UserProfile> {
        let identity = self.auth.authenticate(bearer).await?;
        self.profile_of(identity.id).await
    }

    pub async fn get_user_by_id(&self, bearer: Option<&str>, id: Uuid) -> Result<UserProfile> {
        self.auth.authenticate(bearer).await?;
        self.profile_of(id).await
    }

    pub async fn search_users(
        &self,
        bearer: Option<&str>,
        keyword: &str,
    ) -> Result<Vec<crate::models::Author>> {
        self.auth.authenticate(bearer).await?;
        self.users.search(keyword).await
    }

    /// Two independent two-hop joins, materialized onto the user record.
    async fn profile_of(&self, id: Uuid) -> Result<UserProfile> {
        let author = self
            .users
            .find_author(id)
            .await?
            .ok_or(AppError::NotFound("user"))?;

        let followings_detail = self.graph.following_of(id).await?;
        let followers_detail = self.graph.followers_of(id).await?;

        Ok(UserProfile {
            id: author.id,
            name: author.name,
            username: author.username,
            email: author.email,
            followings_detail,
            followers_detail,
        })
    }

    /// Authenticate without running any operation; exposed for transports
    /// that gate endpoints themselves.
    pub async fn authenticate(&self, bearer: Option<&str>) -> Result<Identity> {
        self.auth.authenticate(bearer).await
    }
}
