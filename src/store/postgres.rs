//! PostgreSQL store implementations
//!
//! Posts keep their comments and likes embedded as JSONB arrays, so a post
//! mutation is a single-row conditional UPDATE and the uniqueness invariant
//! for likes holds without a separate table. Follow edges live in their own
//! table with a composite primary key; `ON CONFLICT DO NOTHING` makes the
//! edge insert atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Author, Comment, FeedPost, Like, NewPost, NewUser, User};
use crate::store::{GraphStore, InsertOutcome, PostStore, UserStore};

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(&self, user: NewUser) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        debug!(user_id = %id, username = %user.username, "Created user");
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, username, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_author(&self, id: Uuid) -> Result<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT id, name, username, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(author)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT id, name, username, email
            FROM users
            WHERE name ILIKE '%' || $1 || '%' OR username ILIKE '%' || $1 || '%'
            "#,
        )
        .bind(keyword)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }
}

/// Map a unique-constraint violation onto the matching conflict variant.
fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match db.constraint() {
                Some("users_username_key") => return AppError::UsernameTaken,
                Some("users_email_key") => return AppError::EmailTaken,
                _ => {}
            }
        }
    }
    AppError::Database(err)
}

/// Row shape for the post-with-author join.
#[derive(sqlx::FromRow)]
struct FeedPostRow {
    id: Uuid,
    author_id: Uuid,
    content: String,
    tags: Vec<String>,
    img_url: Option<String>,
    comments: Json<Vec<Comment>>,
    likes: Json<Vec<Like>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_name: String,
    author_username: String,
    author_email: String,
}

impl From<FeedPostRow> for FeedPost {
    fn from(row: FeedPostRow) -> Self {
        FeedPost {
            id: row.id,
            author_id: row.author_id,
            content: row.content,
            tags: row.tags,
            img_url: row.img_url,
            comments: row.comments.0,
            likes: row.likes.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
            author: Author {
                id: row.author_id,
                name: row.author_name,
                username: row.author_username,
                email: row.author_email,
            },
        }
    }
}

const POST_WITH_AUTHOR: &str = r#"
    SELECT p.id, p.author_id, p.content, p.tags, p.img_url, p.comments, p.likes,
           p.created_at, p.updated_at,
           u.name AS author_name, u.username AS author_username, u.email AS author_email
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert_post(&self, author_id: Uuid, post: NewPost) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO posts (author_id, content, tags, img_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(&post.content)
        .bind(&post.tags)
        .bind(&post.img_url)
        .fetch_one(&self.pool)
        .await?;

        debug!(post_id = %id, author_id = %author_id, "Created post");
        Ok(id)
    }

    async fn feed(&self) -> Result<Vec<FeedPost>> {
        let query = format!("{POST_WITH_AUTHOR} ORDER BY p.updated_at DESC");
        let rows = sqlx::query_as::<_, FeedPostRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(FeedPost::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FeedPost>> {
        let query = format!("{POST_WITH_AUTHOR} WHERE p.id = $1");
        let row = sqlx::query_as::<_, FeedPostRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(FeedPost::from))
    }

    async fn append_comment(&self, post_id: Uuid, comment: Comment) -> Result<()> {
        let affected = sqlx::query(
            r#"
            UPDATE posts
            SET comments = comments || $2::jsonb, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .bind(Json(&comment))
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound("post"));
        }

        debug!(post_id = %post_id, username = %comment.username, "Appended comment");
        Ok(())
    }

    async fn insert_like(&self, post_id: Uuid, like: Like) -> Result<InsertOutcome> {
        // The containment guard and the append are one statement; there is
        // no window where two identical requests both observe "absent".
        let affected = sqlx::query(
            r#"
            UPDATE posts
            SET likes = likes || $2::jsonb
            WHERE id = $1 AND NOT likes @> $3::jsonb
            "#,
        )
        .bind(post_id)
        .bind(Json(&like))
        .bind(Json(json!([{ "username": like.username }])))
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 1 {
            debug!(post_id = %post_id, username = %like.username, "Inserted like");
            return Ok(InsertOutcome::Inserted);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Err(AppError::NotFound("post"))
        }
    }
}

#[derive(Clone)]
pub struct PgGraphStore {
    pool: PgPool,
}

impl PgGraphStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GraphStore for PgGraphStore {
    async fn insert_edge(&self, follower_id: Uuid, following_id: Uuid) -> Result<InsertOutcome> {
        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO follows (follower_id, following_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, following_id) DO NOTHING
            RETURNING follower_id
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(&self.pool)
        .await?;

        if inserted.is_some() {
            debug!(follower = %follower_id, following = %following_id, "Created follow edge");
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::AlreadyExists)
        }
    }

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT u.id, u.name, u.username, u.email
            FROM follows f
            JOIN users u ON u.id = f.following_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT u.id, u.name, u.username, u.email
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.following_id = $1
            ORDER BY f.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }
}
