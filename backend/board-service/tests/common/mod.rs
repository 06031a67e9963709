//! Shared fixtures for store-backed tests.
//!
//! These tests need a live PostgreSQL instance and are skipped when
//! DATABASE_URL is not set, so the default `cargo test` run stays green on
//! machines without a database.
#![allow(dead_code)]

use board_service::models::{ExperienceLevel, JobType};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping store-backed test");
            return None;
        }
    };

    let pool = PgPool::connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

pub async fn seed_user(pool: &PgPool) -> Uuid {
    sqlx::query_scalar("INSERT INTO users (oauth_id, fullname) VALUES ($1, $2) RETURNING id")
        .bind(format!("oauth-{}", Uuid::new_v4()))
        .bind("Test User")
        .fetch_one(pool)
        .await
        .expect("seed user")
}

pub async fn seed_post(pool: &PgPool, author_id: Uuid, title: &str) -> Uuid {
    seed_post_with(pool, author_id, title, JobType::FullTime, false, 0).await
}

/// Seed a post with an explicit job type, archived flag, and age in seconds
/// (so listing order is deterministic).
pub async fn seed_post_with(
    pool: &PgPool,
    author_id: Uuid,
    title: &str,
    job_type: JobType,
    archived: bool,
    age_secs: i32,
) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO posts (author_id, title, description, job_type, experience_level,
                           resume_key, archived, created_at)
        VALUES ($1, $2, 'seeded for tests', $3, $4, 'resume-key', $5,
                NOW() - make_interval(secs => $6))
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(title)
    .bind(job_type)
    .bind(ExperienceLevel::Mid)
    .bind(archived)
    .bind(age_secs as f64)
    .fetch_one(pool)
    .await
    .expect("seed post")
}

pub async fn seed_comment(pool: &PgPool, post_id: Uuid, author_id: Uuid) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO comments (post_id, author_id, content) VALUES ($1, $2, 'seeded comment') RETURNING id",
    )
    .bind(post_id)
    .bind(author_id)
    .fetch_one(pool)
    .await
    .expect("seed comment")
}

/// Read the comment's counters and actual set cardinalities.
pub async fn comment_counts(pool: &PgPool, comment_id: Uuid) -> (i64, i64, i64, i64) {
    sqlx::query_as(
        r#"
        SELECT total_up_likes,
               total_down_likes,
               (SELECT COUNT(*) FROM comment_up_likes WHERE comment_id = c.id),
               (SELECT COUNT(*) FROM comment_down_likes WHERE comment_id = c.id)
        FROM comments c
        WHERE c.id = $1
        "#,
    )
    .bind(comment_id)
    .fetch_one(pool)
    .await
    .expect("fetch comment counts")
}
