//! Post service - creation, retrieval, archival and favorites.
//!
//! Favorite mutations follow the same lock-then-mutate shape as the vote
//! engine: the post row is locked `FOR UPDATE`, then the membership row and
//! the `total_favorites` counter change in one transaction.

use crate::error::{AppError, Result};
use crate::models::{AuthorLinks, ExperienceLevel, FavoriteAction, JobType, Post, PostDetail};
use sqlx::PgPool;
use uuid::Uuid;

/// Fields required to create a post.
#[derive(Debug)]
pub struct NewPost<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub resume_key: &'a str,
}

/// Fields of a post update; all core fields are required, as on create.
#[derive(Debug)]
pub struct PostUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
}

#[derive(Clone)]
pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new post
    pub async fn create_post(&self, author_id: Uuid, new: NewPost<'_>) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, title, description, job_type, experience_level, resume_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, author_id, title, description, job_type, experience_level,
                      resume_key, archived, total_favorites, created_at, updated_at
            "#,
        )
        .bind(author_id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.job_type)
        .bind(new.experience_level)
        .bind(new.resume_key)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(post_id = %post.id, %author_id, "post created");
        Ok(post)
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, description, job_type, experience_level,
                   resume_key, archived, total_favorites, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Get a post together with its author's public links
    pub async fn get_post_detail(&self, post_id: Uuid) -> Result<Option<PostDetail>> {
        let Some(post) = self.get_post(post_id).await? else {
            return Ok(None);
        };

        let author = sqlx::query_as::<_, AuthorLinks>(
            "SELECT github_link, linkedin_link, other_link FROM users WHERE id = $1",
        )
        .bind(post.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(PostDetail { post, author }))
    }

    /// Update a post's core fields. Only the author may update.
    pub async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        update: PostUpdate<'_>,
    ) -> Result<Post> {
        self.check_ownership(post_id, author_id).await?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $3, description = $4, job_type = $5, experience_level = $6,
                updated_at = NOW()
            WHERE id = $1 AND author_id = $2
            RETURNING id, author_id, title, description, job_type, experience_level,
                      resume_key, archived, total_favorites, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.job_type)
        .bind(update.experience_level)
        .fetch_optional(&self.pool)
        .await?;

        post.ok_or_else(|| AppError::NotFound(format!("post {post_id} does not exist")))
    }

    /// Delete a post. Only the author may delete; the deletion is immediate
    /// and cascades over comments, votes and favorites.
    pub async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<()> {
        self.check_ownership(post_id, author_id).await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(post_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("post {post_id} does not exist")));
        }

        tracing::info!(%post_id, %author_id, "post deleted");
        Ok(())
    }

    /// Flip the archived flag. Only the author may archive or unarchive.
    pub async fn set_archived(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        archived: bool,
    ) -> Result<Post> {
        self.check_ownership(post_id, author_id).await?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET archived = $3, updated_at = NOW()
            WHERE id = $1 AND author_id = $2
            RETURNING id, author_id, title, description, job_type, experience_level,
                      resume_key, archived, total_favorites, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(archived)
        .fetch_optional(&self.pool)
        .await?;

        post.ok_or_else(|| AppError::NotFound(format!("post {post_id} does not exist")))
    }

    /// Add or remove a favorite. Adding an existing favorite or removing an
    /// absent one is an impossible action and fails with a conflict.
    pub async fn set_favorite(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        action: FavoriteAction,
    ) -> Result<Post> {
        let mut tx = self.pool.begin().await?;

        // Lock the post row so the counter tracks the membership table.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!("post {post_id} does not exist")));
        }

        let has_favorite: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM post_favorites WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let delta: i64 = match (has_favorite, action) {
            (false, FavoriteAction::Add) => {
                sqlx::query(
                    "INSERT INTO post_favorites (post_id, user_id) VALUES ($1, $2)
                     ON CONFLICT DO NOTHING",
                )
                .bind(post_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
                1
            }
            (true, FavoriteAction::Remove) => {
                sqlx::query("DELETE FROM post_favorites WHERE post_id = $1 AND user_id = $2")
                    .bind(post_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
                -1
            }
            (true, FavoriteAction::Add) => {
                return Err(AppError::Conflict(format!(
                    "post {post_id} is already in your favorites"
                )))
            }
            (false, FavoriteAction::Remove) => {
                return Err(AppError::Conflict(format!(
                    "post {post_id} is not in your favorites"
                )))
            }
        };

        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET total_favorites = total_favorites + $2
            WHERE id = $1
            RETURNING id, author_id, title, description, job_type, experience_level,
                      resume_key, archived, total_favorites, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(post)
    }

    /// Is the post in the user's favorites
    pub async fn is_favorite(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let exists: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM post_favorites pf
                          WHERE pf.post_id = posts.id AND pf.user_id = $2)
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        exists.ok_or_else(|| AppError::NotFound(format!("post {post_id} does not exist")))
    }

    /// NotFound for a missing post, Forbidden for someone else's post.
    async fn check_ownership(&self, post_id: Uuid, author_id: Uuid) -> Result<()> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        match owner {
            None => Err(AppError::NotFound(format!("post {post_id} does not exist"))),
            Some(owner) if owner != author_id => Err(AppError::Forbidden(
                "only the author can modify this post".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}
