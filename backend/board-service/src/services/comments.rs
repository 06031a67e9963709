//! Comment service - creation, editing and deletion.
//!
//! Vote handling lives in [`crate::services::votes`]; comment listing lives
//! in [`crate::services::listing`].

use crate::error::{AppError, Result};
use crate::models::Comment;
use crate::services::moderation;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new comment on a post
    pub async fn create_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Comment> {
        Self::screen_content(content)?;

        let post_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;
        if !post_exists {
            return Err(AppError::NotFound(format!("post {post_id} does not exist")));
        }

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, content, total_up_likes, total_down_likes,
                      created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Update a comment's content. Only the author may update.
    pub async fn update_comment(
        &self,
        comment_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Comment> {
        Self::screen_content(content)?;
        self.check_ownership(comment_id, author_id).await?;

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $3, updated_at = NOW()
            WHERE id = $1 AND author_id = $2
            RETURNING id, post_id, author_id, content, total_up_likes, total_down_likes,
                      created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(author_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        comment.ok_or_else(|| AppError::NotFound(format!("comment {comment_id} does not exist")))
    }

    /// Delete a comment. Only the author may delete; votes cascade away.
    pub async fn delete_comment(&self, comment_id: Uuid, author_id: Uuid) -> Result<()> {
        self.check_ownership(comment_id, author_id).await?;

        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND author_id = $2")
            .bind(comment_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "comment {comment_id} does not exist"
            )));
        }

        Ok(())
    }

    fn screen_content(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("comment content is required".to_string()));
        }
        if moderation::contains_banned_word(content) {
            return Err(AppError::Validation(
                "comment contains inappropriate content".to_string(),
            ));
        }
        Ok(())
    }

    /// NotFound for a missing comment, Forbidden for someone else's comment.
    async fn check_ownership(&self, comment_id: Uuid, author_id: Uuid) -> Result<()> {
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT author_id FROM comments WHERE id = $1")
                .bind(comment_id)
                .fetch_optional(&self.pool)
                .await?;

        match owner {
            None => Err(AppError::NotFound(format!(
                "comment {comment_id} does not exist"
            ))),
            Some(owner) if owner != author_id => Err(AppError::Forbidden(
                "only the author can modify this comment".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}
