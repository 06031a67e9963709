//! Comment vote engine.
//!
//! A user holds at most one vote per comment. Voting the same direction
//! again retracts it; voting the opposite direction switches it. The counter
//! columns on the comment row mirror the membership tables and are updated
//! in the same transaction as the membership mutation, after a `FOR UPDATE`
//! lock on the comment row, so concurrent votes on one comment serialize and
//! the counters cannot drift from set cardinality.

use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::Comment;
use sqlx::PgPool;
use uuid::Uuid;

/// Vote direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    Up,
    Down,
}

impl VoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteKind::Up => "up",
            VoteKind::Down => "down",
        }
    }
}

/// A user's current membership in a comment's two vote sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteState {
    pub up: bool,
    pub down: bool,
}

/// Membership after a toggle, plus the counter adjustments that keep the
/// denormalized totals equal to set cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    pub next: VoteState,
    pub up_delta: i64,
    pub down_delta: i64,
}

impl VoteTransition {
    /// What this toggle did, for logs and metrics.
    pub fn outcome(&self, previous: VoteState, kind: VoteKind) -> &'static str {
        let joined = match kind {
            VoteKind::Up => self.next.up,
            VoteKind::Down => self.next.down,
        };
        let left_opposite = match kind {
            VoteKind::Up => previous.down,
            VoteKind::Down => previous.up,
        };
        if !joined {
            "retracted"
        } else if left_opposite {
            "switched"
        } else {
            "cast"
        }
    }
}

/// Toggle-with-exclusivity: joining one set silently retracts any vote in
/// the opposite set; toggling an existing vote only retracts it.
pub fn toggle(state: VoteState, kind: VoteKind) -> VoteTransition {
    match kind {
        VoteKind::Up => {
            if state.up {
                VoteTransition {
                    next: VoteState {
                        up: false,
                        down: state.down,
                    },
                    up_delta: -1,
                    down_delta: 0,
                }
            } else {
                VoteTransition {
                    next: VoteState {
                        up: true,
                        down: false,
                    },
                    up_delta: 1,
                    down_delta: if state.down { -1 } else { 0 },
                }
            }
        }
        VoteKind::Down => {
            if state.down {
                VoteTransition {
                    next: VoteState {
                        up: state.up,
                        down: false,
                    },
                    up_delta: 0,
                    down_delta: -1,
                }
            } else {
                VoteTransition {
                    next: VoteState {
                        up: false,
                        down: true,
                    },
                    up_delta: if state.up { -1 } else { 0 },
                    down_delta: 1,
                }
            }
        }
    }
}

/// Vote engine bound to the persistent store.
#[derive(Clone)]
pub struct VoteService {
    pool: PgPool,
}

impl VoteService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply one vote toggle for `user_id` on `comment_id` and return the
    /// updated comment.
    pub async fn apply_vote(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        kind: VoteKind,
    ) -> Result<Comment> {
        let mut tx = self.pool.begin().await?;

        // Lock the comment row; every vote on this comment queues behind it.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM comments WHERE id = $1 FOR UPDATE")
                .bind(comment_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!(
                "comment {comment_id} does not exist"
            )));
        }

        let up: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM comment_up_likes WHERE comment_id = $1 AND user_id = $2)",
        )
        .bind(comment_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let down: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM comment_down_likes WHERE comment_id = $1 AND user_id = $2)",
        )
        .bind(comment_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let state = VoteState { up, down };
        let transition = toggle(state, kind);

        if transition.next.up != state.up {
            if transition.next.up {
                sqlx::query(
                    "INSERT INTO comment_up_likes (comment_id, user_id) VALUES ($1, $2)
                     ON CONFLICT DO NOTHING",
                )
                .bind(comment_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            } else {
                sqlx::query("DELETE FROM comment_up_likes WHERE comment_id = $1 AND user_id = $2")
                    .bind(comment_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        if transition.next.down != state.down {
            if transition.next.down {
                sqlx::query(
                    "INSERT INTO comment_down_likes (comment_id, user_id) VALUES ($1, $2)
                     ON CONFLICT DO NOTHING",
                )
                .bind(comment_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            } else {
                sqlx::query(
                    "DELETE FROM comment_down_likes WHERE comment_id = $1 AND user_id = $2",
                )
                .bind(comment_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET total_up_likes = total_up_likes + $2,
                total_down_likes = total_down_likes + $3
            WHERE id = $1
            RETURNING id, post_id, author_id, content, total_up_likes, total_down_likes,
                      created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(transition.up_delta)
        .bind(transition.down_delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let outcome = transition.outcome(state, kind);
        metrics::VOTE_OPERATIONS_TOTAL
            .with_label_values(&[kind.as_str(), outcome])
            .inc();
        tracing::debug!(%comment_id, %user_id, direction = kind.as_str(), outcome, "vote applied");

        Ok(comment)
    }
}
